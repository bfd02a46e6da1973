use crate::application::otp::{ChallengeRegistry, OTP_TTL_SECONDS};
use crate::domain::account::{
    Account, AccountSummary, Amount, Balance, BalanceChange, NewAccount,
};
use crate::domain::challenge::{ChallengePayload, ChallengePurpose};
use crate::domain::ledger::{
    ADMIN_COUNTERPARTY, EntryKind, LedgerEntry, LedgerFilter, STATEMENT_ROWS, Statement,
};
use crate::domain::ports::{
    BankStoreBox, ChallengeStoreBox, ClockRef, NotifierBox, TransferStoreBox,
};
use crate::domain::transfer::{StagedTransfer, TransferReceipt};
use crate::error::{BankError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// The main entry point for the banking core.
///
/// `BankEngine` ties the account store, the challenge registry and the
/// staged-transfer store together. All dependencies are injected at
/// construction, so deterministic tests can swap in a manual clock, a
/// recording notifier and in-memory stores.
///
/// Transfers follow a two-phase commit: `request_transfer` stages the
/// transfer and issues a time-boxed code, and only `confirm_transfer`
/// materializes balances and ledger entries. Nothing persistent changes
/// until confirmation succeeds.
pub struct BankEngine {
    store: BankStoreBox,
    challenges: ChallengeRegistry,
    transfers: TransferStoreBox,
    notifier: NotifierBox,
    clock: ClockRef,
    admin_secret: String,
}

impl BankEngine {
    pub fn new(
        store: BankStoreBox,
        challenges: ChallengeStoreBox,
        transfers: TransferStoreBox,
        notifier: NotifierBox,
        clock: ClockRef,
        admin_secret: impl Into<String>,
    ) -> Self {
        Self {
            store,
            challenges: ChallengeRegistry::new(challenges, clock.clone()),
            transfers,
            notifier,
            clock,
            admin_secret: admin_secret.into(),
        }
    }

    /// Creates an account with a fresh random 10-digit account number and a
    /// zero balance. Applicants must be at least 18 years old.
    pub async fn register(&self, new: NewAccount) -> Result<Account> {
        let birth = NaiveDate::parse_from_str(new.dob.trim(), "%Y-%m-%d").map_err(|_| {
            BankError::Validation("invalid date of birth, use YYYY-MM-DD".to_string())
        })?;
        let age = self.clock.now().year() - birth.year();
        if age < 18 {
            return Err(BankError::Validation(
                "you must be at least 18 years old".to_string(),
            ));
        }

        let account = Account {
            account_number: rand::thread_rng()
                .gen_range(1_000_000_000u64..=9_999_999_999u64)
                .to_string(),
            username: new.username.trim().to_string(),
            password: new.password,
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone.trim().to_string(),
            dob: new.dob.trim().to_string(),
            age,
            address: new.address,
            profile: "default.png".to_string(),
            balance: Balance::ZERO,
            upi_pin: new.upi_pin.trim().to_string(),
        };
        self.store.insert(account.clone()).await?;
        tracing::info!(account = %account.account_number, "account created");
        Ok(account)
    }

    /// Resolves the identifier (username, email or phone) and checks the
    /// password. The failure message never reveals which part was wrong.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<Account> {
        let account = self.store.get_by_identifier(identifier.trim()).await?;
        match account {
            Some(account) if account.password == password => Ok(account),
            _ => Err(BankError::Authorization(
                "invalid username/email/phone or password".to_string(),
            )),
        }
    }

    pub async fn deposit(&self, identifier: &str, amount: Decimal) -> Result<Balance> {
        let amount = Amount::new(amount)?;
        let account = self.get_account(identifier).await?;
        let entry = LedgerEntry::new(
            &account.account_number,
            EntryKind::Deposit,
            amount,
            None,
            self.clock.now(),
        );
        let balance = self
            .store
            .apply(&account.account_number, BalanceChange::Credit(amount), entry)
            .await?;
        tracing::info!(account = %account.account_number, %amount, "deposit committed");
        Ok(balance)
    }

    /// Withdrawals are gated by the UPI PIN. The funds check runs inside
    /// the store's commit, so a concurrent debit cannot slip through.
    pub async fn withdraw(&self, identifier: &str, amount: Decimal, pin: &str) -> Result<Balance> {
        let account = self.get_account(identifier).await?;
        if pin.trim() != account.upi_pin {
            return Err(BankError::Authorization("incorrect UPI PIN".to_string()));
        }
        let amount = Amount::new(amount)?;
        let entry = LedgerEntry::new(
            &account.account_number,
            EntryKind::Withdraw,
            amount,
            None,
            self.clock.now(),
        );
        let balance = self
            .store
            .apply(&account.account_number, BalanceChange::Debit(amount), entry)
            .await?;
        tracing::info!(account = %account.account_number, %amount, "withdrawal committed");
        Ok(balance)
    }

    /// First phase of a transfer: validate, stage, and issue the
    /// confirmation code. No balance or ledger mutation happens here.
    ///
    /// Returns the delivery identifier (the sender's email) so the caller
    /// can tell the user where the code went.
    pub async fn request_transfer(
        &self,
        identifier: &str,
        destination_account: &str,
        destination_name: &str,
        amount: Decimal,
        pin: &str,
    ) -> Result<String> {
        let sender = self.get_account(identifier).await?;
        if pin.trim() != sender.upi_pin {
            return Err(BankError::Authorization("incorrect UPI PIN".to_string()));
        }
        // The balance read here is only a pre-check; it is repeated inside
        // the store's lock at commit time, since time passes during the
        // challenge window.
        let amount = match Amount::new(amount) {
            Ok(amount) if Balance::from(amount) <= sender.balance => amount,
            _ => {
                return Err(BankError::Validation(
                    "invalid or insufficient balance".to_string(),
                ));
            }
        };
        let receiver = self
            .store
            .get_by_account_number(destination_account.trim())
            .await?;
        let Some(receiver) = receiver else {
            return Err(BankError::NotFound(
                "receiver not found or name mismatch".to_string(),
            ));
        };
        if receiver.name.to_lowercase() != destination_name.trim().to_lowercase() {
            return Err(BankError::NotFound(
                "receiver not found or name mismatch".to_string(),
            ));
        }
        if receiver.account_number == sender.account_number {
            return Err(BankError::Validation(
                "cannot transfer to your own account".to_string(),
            ));
        }

        self.transfers
            .put(StagedTransfer {
                sender: sender.username.clone(),
                source_account: sender.account_number.clone(),
                destination_account: receiver.account_number.clone(),
                destination_name: receiver.name.clone(),
                amount,
                created_at: self.clock.now(),
            })
            .await?;
        let code = self
            .challenges
            .issue(
                &sender.email,
                ChallengePurpose::TransferConfirm,
                ChallengePayload::TransferConfirm {
                    sender: sender.username.clone(),
                },
            )
            .await?;
        self.send_code(
            &sender.email,
            "Nova-Bank transfer confirmation code",
            &format!("Your Nova-Bank transfer code is: {code}\n\nThis code will expire in 5 minutes."),
        )
        .await;
        Ok(sender.email)
    }

    /// Re-issues the confirmation code for the sender's pending transfer.
    /// Issuing invalidates the previous code, and the staged transfer's
    /// lifetime restarts alongside the new challenge.
    pub async fn resend_transfer_code(&self, identifier: &str) -> Result<String> {
        let sender = self.get_account(identifier).await?;
        let Some(mut staged) = self.live_staged(&sender.username).await? else {
            return Err(BankError::State(
                "no pending transfer found or already processed".to_string(),
            ));
        };
        staged.created_at = self.clock.now();
        self.transfers.put(staged).await?;
        let code = self
            .challenges
            .issue(
                &sender.email,
                ChallengePurpose::TransferConfirm,
                ChallengePayload::TransferConfirm {
                    sender: sender.username.clone(),
                },
            )
            .await?;
        self.send_code(
            &sender.email,
            "Nova-Bank transfer confirmation code",
            &format!("Your Nova-Bank transfer code is: {code}\n\nThis code will expire in 5 minutes."),
        )
        .await;
        Ok(sender.email)
    }

    /// Second phase of a transfer: verify the code, consume the staged
    /// transfer exactly once, and commit.
    ///
    /// A verification failure is surfaced verbatim and leaves the staged
    /// transfer untouched, so a mistyped code only burns a challenge
    /// attempt. The store re-validates the sender's balance inside its own
    /// lock immediately before mutating it; if funds dropped below the
    /// staged amount in the meantime the transfer is cancelled, not
    /// retried.
    pub async fn confirm_transfer(&self, identifier: &str, code: &str) -> Result<TransferReceipt> {
        let sender = self.get_account(identifier).await?;
        let payload = self
            .challenges
            .verify(&sender.email, code, ChallengePurpose::TransferConfirm)
            .await?;
        let ChallengePayload::TransferConfirm {
            sender: staged_sender,
        } = payload
        else {
            return Err(BankError::State(
                "code was issued for a different action".to_string(),
            ));
        };

        let Some(staged) = self.live_staged(&staged_sender).await? else {
            return Err(BankError::State(
                "no pending transfer found or already processed".to_string(),
            ));
        };

        let timestamp = self.clock.now();
        let debit_entry = LedgerEntry::new(
            &staged.source_account,
            EntryKind::Transfer,
            staged.amount,
            Some(staged.destination_account.clone()),
            timestamp,
        );
        let credit_entry = LedgerEntry::new(
            &staged.destination_account,
            EntryKind::Received,
            staged.amount,
            Some(staged.source_account.clone()),
            timestamp,
        );
        let (sender_balance, _) = self
            .store
            .transfer(
                &staged.source_account,
                &staged.destination_account,
                staged.amount,
                debit_entry,
                credit_entry,
            )
            .await?;
        tracing::info!(
            amount = %staged.amount,
            from = %staged.source_account,
            to = %staged.destination_account,
            "transfer committed"
        );
        Ok(TransferReceipt {
            amount: staged.amount,
            destination_account: staged.destination_account,
            destination_name: staged.destination_name,
            sender_balance,
            timestamp,
        })
    }

    /// Starts a PIN change: validates the old PIN and the new PIN's
    /// format, then issues a code carrying the new PIN.
    pub async fn request_pin_change(
        &self,
        identifier: &str,
        old_pin: &str,
        new_pin: &str,
        confirm_pin: &str,
    ) -> Result<String> {
        let account = self.get_account(identifier).await?;
        if old_pin.trim() != account.upi_pin {
            return Err(BankError::Authorization(
                "old UPI PIN is incorrect".to_string(),
            ));
        }
        let new_pin = new_pin.trim();
        if new_pin.len() != 6 || !new_pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(BankError::Validation(
                "new UPI PIN must be exactly 6 digits".to_string(),
            ));
        }
        if new_pin != confirm_pin.trim() {
            return Err(BankError::Validation(
                "new PIN and confirmation do not match".to_string(),
            ));
        }

        let code = self
            .challenges
            .issue(
                &account.email,
                ChallengePurpose::PinChange,
                ChallengePayload::PinChange {
                    username: account.username.clone(),
                    new_pin: new_pin.to_string(),
                },
            )
            .await?;
        self.send_code(
            &account.email,
            "Nova-Bank UPI PIN change code",
            &format!(
                "Hello {},\n\nYour code for changing your Nova-Bank UPI PIN is: {code}\nThis code expires in 5 minutes.\n\nIf you did not request this, please ignore this email.",
                account.name
            ),
        )
        .await;
        Ok(account.email)
    }

    pub async fn confirm_pin_change(&self, identifier: &str, code: &str) -> Result<()> {
        let account = self.get_account(identifier).await?;
        let payload = self
            .challenges
            .verify(&account.email, code, ChallengePurpose::PinChange)
            .await?;
        let ChallengePayload::PinChange { new_pin, .. } = payload else {
            return Err(BankError::State(
                "code was issued for a different action".to_string(),
            ));
        };
        self.store.set_upi_pin(&account.email, &new_pin).await?;
        tracing::info!(account = %account.account_number, "UPI PIN updated");
        Ok(())
    }

    /// Starts a password reset. Returns `Ok(None)` for unknown identifiers
    /// so callers can show the same "if this account exists…" message
    /// either way and nothing is learned by probing.
    pub async fn request_password_reset(&self, identifier: &str) -> Result<Option<String>> {
        let Some(account) = self.store.get_by_identifier(identifier.trim()).await? else {
            return Ok(None);
        };
        let code = self
            .challenges
            .issue(
                &account.email,
                ChallengePurpose::PasswordReset,
                ChallengePayload::PasswordReset {
                    username: account.username.clone(),
                },
            )
            .await?;
        self.send_code(
            &account.email,
            "Nova-Bank password reset code",
            &format!("Your Nova-Bank password reset code is: {code}\nIt expires in 5 minutes."),
        )
        .await;
        Ok(Some(account.email))
    }

    /// Verifies the reset code and sets the new password in one step.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        if new_password.trim().is_empty() {
            return Err(BankError::Validation(
                "provide a valid new password".to_string(),
            ));
        }
        let payload = self
            .challenges
            .verify(email.trim(), code, ChallengePurpose::PasswordReset)
            .await?;
        let ChallengePayload::PasswordReset { username } = payload else {
            return Err(BankError::State(
                "code was issued for a different action".to_string(),
            ));
        };
        let Some(account) = self.store.get_by_identifier(&username).await? else {
            return Err(BankError::NotFound("account not found".to_string()));
        };
        self.store.set_password(&account.email, new_password).await?;
        tracing::info!(account = %account.account_number, "password updated");
        Ok(())
    }

    /// Manual credit from the admin console, gated by the shared admin
    /// secret. Recorded with the `BANK-ADMIN` counterparty sentinel.
    pub async fn admin_deposit(
        &self,
        secret: &str,
        account_number: &str,
        amount: Decimal,
    ) -> Result<Balance> {
        if secret != self.admin_secret {
            return Err(BankError::Authorization(
                "incorrect admin password".to_string(),
            ));
        }
        let amount = Amount::new(amount)?;
        let Some(account) = self
            .store
            .get_by_account_number(account_number.trim())
            .await?
        else {
            return Err(BankError::NotFound("account not found".to_string()));
        };
        let entry = LedgerEntry::new(
            &account.account_number,
            EntryKind::AdminDeposit,
            amount,
            Some(ADMIN_COUNTERPARTY.to_string()),
            self.clock.now(),
        );
        let balance = self
            .store
            .apply(&account.account_number, BalanceChange::Credit(amount), entry)
            .await?;
        tracing::info!(account = %account.account_number, %amount, "admin deposit committed");
        Ok(balance)
    }

    /// Ledger history for one account, newest first.
    pub async fn query_ledger(
        &self,
        account_number: &str,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>> {
        self.store.query(account_number.trim(), filter).await
    }

    /// Ledger history across all accounts, newest first (admin audit view).
    pub async fn audit_ledger(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        self.store.query_all(filter).await
    }

    /// Admin dashboard projection of every account, sorted by account
    /// number, without credential fields.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let mut accounts = self.store.all().await?;
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(accounts.iter().map(AccountSummary::from).collect())
    }

    /// Mini-statement data: the last [`STATEMENT_ROWS`] entries, newest
    /// first, with the holder name and a generation timestamp.
    pub async fn statement(&self, account_number: &str) -> Result<Statement> {
        let Some(account) = self
            .store
            .get_by_account_number(account_number.trim())
            .await?
        else {
            return Err(BankError::NotFound("account not found".to_string()));
        };
        let rows = self
            .store
            .recent(&account.account_number, STATEMENT_ROWS)
            .await?;
        Ok(Statement {
            account_number: account.account_number,
            holder_name: account.name,
            generated_at: self.clock.now(),
            rows,
        })
    }

    async fn get_account(&self, identifier: &str) -> Result<Account> {
        let account = self.store.get_by_identifier(identifier.trim()).await?;
        account.ok_or_else(|| BankError::NotFound("account not found".to_string()))
    }

    /// Pops the sender's staged transfer if it is still within the
    /// challenge TTL. Stale entries are reaped here, on access; there is
    /// no background sweeper.
    async fn live_staged(&self, sender: &str) -> Result<Option<StagedTransfer>> {
        match self.transfers.remove(sender).await? {
            Some(staged)
                if self.clock.now()
                    <= staged.created_at + Duration::seconds(OTP_TTL_SECONDS) =>
            {
                Ok(Some(staged))
            }
            _ => Ok(None),
        }
    }

    /// Delivery failure must not fail the operation that issued the code;
    /// the challenge stays valid and the caller can resend.
    async fn send_code(&self, to: &str, subject: &str, body: &str) {
        if !self.notifier.send(to, subject, body).await {
            tracing::warn!(to, subject, "delivery failed; the issued code remains valid");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::in_memory::{
        InMemoryBankStore, InMemoryChallengeStore, InMemoryTransferStore,
    };
    use crate::infrastructure::notifier::RecordingNotifier;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const ADMIN_SECRET: &str = "sesame";

    fn engine() -> (BankEngine, RecordingNotifier, ManualClock) {
        let clock = ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        let notifier = RecordingNotifier::new();
        let engine = BankEngine::new(
            Box::new(InMemoryBankStore::new()),
            Box::new(InMemoryChallengeStore::new()),
            Box::new(InMemoryTransferStore::new()),
            Box::new(notifier.clone()),
            Arc::new(clock.clone()),
            ADMIN_SECRET,
        );
        (engine, notifier, clock)
    }

    fn new_account(username: &str, name: &str) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            email: format!("{username}@example.com"),
            phone: format!("555{username}"),
            dob: "1990-06-01".to_string(),
            address: String::new(),
            username: username.to_string(),
            password: format!("{username}-pw"),
            upi_pin: "123456".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_assigns_account_number_and_zero_balance() {
        let (engine, _, _) = engine();
        let account = engine.register(new_account("alice", "Alice Smith")).await.unwrap();
        assert_eq!(account.account_number.len(), 10);
        assert_eq!(account.balance, Balance::ZERO);
        assert_eq!(account.age, 36);
    }

    #[tokio::test]
    async fn test_register_rejects_minors_and_bad_dob() {
        let (engine, _, _) = engine();

        let mut minor = new_account("kid", "Kid Doe");
        minor.dob = "2015-06-01".to_string();
        assert!(matches!(
            engine.register(minor).await,
            Err(BankError::Validation(_))
        ));

        let mut malformed = new_account("bob", "Bob Jones");
        malformed.dob = "01/06/1990".to_string();
        assert!(matches!(
            engine.register(malformed).await,
            Err(BankError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_identifiers() {
        let (engine, _, _) = engine();
        engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        let mut dup = new_account("alice2", "Other Alice");
        dup.email = "alice@example.com".to_string();
        assert!(matches!(
            engine.register(dup).await,
            Err(BankError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_by_any_identifier() {
        let (engine, _, _) = engine();
        engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        assert!(engine.authenticate("alice", "alice-pw").await.is_ok());
        assert!(engine.authenticate("alice@example.com", "alice-pw").await.is_ok());
        assert!(engine.authenticate("555alice", "alice-pw").await.is_ok());
        assert!(matches!(
            engine.authenticate("alice", "wrong").await,
            Err(BankError::Authorization(_))
        ));
        assert!(matches!(
            engine.authenticate("nobody", "alice-pw").await,
            Err(BankError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_deposit_and_withdraw() {
        let (engine, _, _) = engine();
        engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        let balance = engine.deposit("alice", dec!(100.0)).await.unwrap();
        assert_eq!(balance, Balance::new(dec!(100.0)));

        let balance = engine.withdraw("alice", dec!(40.0), "123456").await.unwrap();
        assert_eq!(balance, Balance::new(dec!(60.0)));

        assert!(matches!(
            engine.withdraw("alice", dec!(40.0), "000000").await,
            Err(BankError::Authorization(_))
        ));
        assert!(matches!(
            engine.withdraw("alice", dec!(1000.0), "123456").await,
            Err(BankError::InsufficientFunds)
        ));
        assert!(matches!(
            engine.deposit("alice", dec!(-5.0)).await,
            Err(BankError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_deposit_requires_secret() {
        let (engine, _, _) = engine();
        let account = engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        assert!(matches!(
            engine
                .admin_deposit("wrong", &account.account_number, dec!(10.0))
                .await,
            Err(BankError::Authorization(_))
        ));

        let balance = engine
            .admin_deposit(ADMIN_SECRET, &account.account_number, dec!(10.0))
            .await
            .unwrap();
        assert_eq!(balance, Balance::new(dec!(10.0)));

        let entries = engine
            .query_ledger(&account.account_number, &LedgerFilter::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::AdminDeposit);
        assert_eq!(entries[0].counterparty.as_deref(), Some(ADMIN_COUNTERPARTY));
    }

    #[tokio::test]
    async fn test_pin_change_flow() {
        let (engine, notifier, _) = engine();
        engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        assert!(matches!(
            engine
                .request_pin_change("alice", "999999", "654321", "654321")
                .await,
            Err(BankError::Authorization(_))
        ));
        assert!(matches!(
            engine
                .request_pin_change("alice", "123456", "12ab56", "12ab56")
                .await,
            Err(BankError::Validation(_))
        ));
        assert!(matches!(
            engine
                .request_pin_change("alice", "123456", "654321", "111111")
                .await,
            Err(BankError::Validation(_))
        ));

        engine
            .request_pin_change("alice", "123456", "654321", "654321")
            .await
            .unwrap();
        let code = notifier.last_code().await.unwrap();
        engine.confirm_pin_change("alice", &code).await.unwrap();

        // The old PIN no longer authorizes withdrawals, the new one does.
        engine.deposit("alice", dec!(10.0)).await.unwrap();
        assert!(matches!(
            engine.withdraw("alice", dec!(1.0), "123456").await,
            Err(BankError::Authorization(_))
        ));
        assert!(engine.withdraw("alice", dec!(1.0), "654321").await.is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (engine, notifier, _) = engine();
        engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        // Unknown identifiers produce no error and no message.
        assert_eq!(
            engine.request_password_reset("nobody").await.unwrap(),
            None
        );

        let email = engine
            .request_password_reset("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(email, "alice@example.com");
        let code = notifier.last_code().await.unwrap();

        engine
            .reset_password("alice@example.com", &code, "new-pw")
            .await
            .unwrap();
        assert!(engine.authenticate("alice", "new-pw").await.is_ok());
        assert!(matches!(
            engine.authenticate("alice", "alice-pw").await,
            Err(BankError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_statement_contract() {
        let (engine, _, _) = engine();
        let account = engine.register(new_account("alice", "Alice Smith")).await.unwrap();

        for i in 1..=25 {
            engine.deposit("alice", Decimal::from(i)).await.unwrap();
        }

        let statement = engine.statement(&account.account_number).await.unwrap();
        assert_eq!(statement.holder_name, "Alice Smith");
        assert_eq!(statement.rows.len(), STATEMENT_ROWS);
        // Newest first: the last deposit (25) leads.
        assert_eq!(statement.rows[0].amount.value(), dec!(25));
        assert_eq!(statement.rows[19].amount.value(), dec!(6));
    }
}
