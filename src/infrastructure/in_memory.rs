use crate::domain::account::{Account, Amount, Balance, BalanceChange};
use crate::domain::challenge::Challenge;
use crate::domain::ledger::{LedgerEntry, LedgerFilter};
use crate::domain::ports::{
    AccountStore, BankStore, ChallengeStore, LedgerStore, TransferStore,
};
use crate::domain::transfer::StagedTransfer;
use crate::error::{BankError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct BankState {
    accounts: HashMap<String, Account>,
    ledger: Vec<LedgerEntry>,
    next_entry_id: u64,
}

impl Default for BankState {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            ledger: Vec::new(),
            next_entry_id: 1,
        }
    }
}

impl BankState {
    fn push_entry(&mut self, mut entry: LedgerEntry) {
        entry.id = self.next_entry_id;
        self.next_entry_id += 1;
        self.ledger.push(entry);
    }
}

/// A thread-safe in-memory bank store.
///
/// Accounts and ledger share one `Arc<RwLock<..>>`, so both commit
/// operations hold a single write lock across the funds check, the balance
/// update(s) and the ledger append — the whole commit is one critical
/// section. The ledger vector is append-only with ascending ids, so
/// newest-first queries just iterate in reverse.
#[derive(Default, Clone)]
pub struct InMemoryBankStore {
    state: Arc<RwLock<BankState>>,
}

impl InMemoryBankStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryBankStore {
    async fn insert(&self, account: Account) -> Result<()> {
        let mut state = self.state.write().await;
        let collision = state.accounts.contains_key(&account.account_number)
            || state.accounts.values().any(|existing| {
                existing.username == account.username
                    || existing.email == account.email
                    || existing.phone == account.phone
            });
        if collision {
            return Err(BankError::Validation(
                "username, email or phone already exists".to_string(),
            ));
        }
        state.accounts.insert(account.account_number.clone(), account);
        Ok(())
    }

    async fn set_password(&self, email: &str, password: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .values_mut()
            .find(|account| account.email == email)
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        account.password = password.to_string();
        Ok(())
    }

    async fn set_upi_pin(&self, email: &str, upi_pin: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .values_mut()
            .find(|account| account.email == email)
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        account.upi_pin = upi_pin.to_string();
        Ok(())
    }

    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|account| account.matches_identifier(identifier))
            .cloned())
    }

    async fn get_by_account_number(&self, account_number: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(account_number).cloned())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().cloned().collect())
    }
}

#[async_trait]
impl LedgerStore for InMemoryBankStore {
    async fn query(&self, account_number: &str, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .ledger
            .iter()
            .rev()
            .filter(|entry| entry.account_number == account_number && entry.matches(filter))
            .cloned()
            .collect())
    }

    async fn query_all(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .ledger
            .iter()
            .rev()
            .filter(|entry| entry.matches(filter))
            .cloned()
            .collect())
    }

    async fn recent(&self, account_number: &str, limit: usize) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .ledger
            .iter()
            .rev()
            .filter(|entry| entry.account_number == account_number)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BankStore for InMemoryBankStore {
    async fn apply(
        &self,
        account_number: &str,
        change: BalanceChange,
        entry: LedgerEntry,
    ) -> Result<Balance> {
        let mut state = self.state.write().await;
        let mut account = state
            .accounts
            .get(account_number)
            .cloned()
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        match change {
            BalanceChange::Credit(amount) => account.credit(amount),
            BalanceChange::Debit(amount) => account.debit(amount)?,
        }
        let balance = account.balance;
        state.accounts.insert(account.account_number.clone(), account);
        state.push_entry(entry);
        Ok(balance)
    }

    async fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Amount,
        debit_entry: LedgerEntry,
        credit_entry: LedgerEntry,
    ) -> Result<(Balance, Balance)> {
        if source == destination {
            return Err(BankError::Validation(
                "cannot transfer to your own account".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        let mut source_account = state
            .accounts
            .get(source)
            .cloned()
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        let mut destination_account = state
            .accounts
            .get(destination)
            .cloned()
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;

        // Both accounts are mutated on clones and written back together,
        // so a failed funds check leaves every row untouched.
        source_account.debit(amount)?;
        destination_account.credit(amount);
        let balances = (source_account.balance, destination_account.balance);

        state
            .accounts
            .insert(source_account.account_number.clone(), source_account);
        state.accounts.insert(
            destination_account.account_number.clone(),
            destination_account,
        );
        state.push_entry(debit_entry);
        state.push_entry(credit_entry);
        Ok(balances)
    }
}

/// In-memory challenge map: one live challenge per identifier.
#[derive(Default, Clone)]
pub struct InMemoryChallengeStore {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.identifier.clone(), challenge);
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<Challenge>> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(identifier).cloned())
    }

    async fn remove(&self, identifier: &str) -> Result<Option<Challenge>> {
        let mut challenges = self.challenges.write().await;
        Ok(challenges.remove(identifier))
    }
}

/// In-memory staged-transfer map: one pending transfer per sender. The
/// `remove` under the write lock is what makes consumption exactly-once
/// under concurrent confirmations.
#[derive(Default, Clone)]
pub struct InMemoryTransferStore {
    transfers: Arc<RwLock<HashMap<String, StagedTransfer>>>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn put(&self, transfer: StagedTransfer) -> Result<()> {
        let mut transfers = self.transfers.write().await;
        transfers.insert(transfer.sender.clone(), transfer);
        Ok(())
    }

    async fn get(&self, sender: &str) -> Result<Option<StagedTransfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.get(sender).cloned())
    }

    async fn remove(&self, sender: &str) -> Result<Option<StagedTransfer>> {
        let mut transfers = self.transfers.write().await;
        Ok(transfers.remove(sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::EntryKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn account(number: &str, username: &str, balance: Decimal) -> Account {
        Account {
            account_number: number.to_string(),
            username: username.to_string(),
            password: "pw".to_string(),
            name: username.to_string(),
            email: format!("{username}@example.com"),
            phone: format!("555{username}"),
            dob: "1990-01-01".to_string(),
            age: 36,
            address: String::new(),
            profile: "default.png".to_string(),
            balance: Balance::new(balance),
            upi_pin: "123456".to_string(),
        }
    }

    fn entry(account_number: &str, kind: EntryKind, amount: Decimal) -> LedgerEntry {
        LedgerEntry::new(
            account_number,
            kind,
            Amount::new(amount).unwrap(),
            None,
            NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_identifier_collisions() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(0))).await.unwrap();

        let mut same_email = account("2", "bob", dec!(0));
        same_email.email = "alice@example.com".to_string();
        assert!(matches!(
            store.insert(same_email).await,
            Err(BankError::Validation(_))
        ));

        assert!(store.insert(account("2", "bob", dec!(0))).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_by_identifier_matches_all_namespaces() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(0))).await.unwrap();

        for identifier in ["alice", "alice@example.com", "555alice"] {
            assert!(store.get_by_identifier(identifier).await.unwrap().is_some());
        }
        assert!(store.get_by_identifier("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_debit_checks_funds_and_appends_nothing_on_failure() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(10.0))).await.unwrap();

        let result = store
            .apply(
                "1",
                BalanceChange::Debit(Amount::new(dec!(20.0)).unwrap()),
                entry("1", EntryKind::Withdraw, dec!(20.0)),
            )
            .await;
        assert!(matches!(result, Err(BankError::InsufficientFunds)));

        let account = store.get_by_account_number("1").await.unwrap().unwrap();
        assert_eq!(account.balance, Balance::new(dec!(10.0)));
        assert!(store.query("1", &LedgerFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_assigns_ascending_entry_ids() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(0))).await.unwrap();

        for amount in [dec!(1.0), dec!(2.0)] {
            store
                .apply(
                    "1",
                    BalanceChange::Credit(Amount::new(amount).unwrap()),
                    entry("1", EntryKind::Deposit, amount),
                )
                .await
                .unwrap();
        }

        let entries = store.query("1", &LedgerFilter::default()).await.unwrap();
        // Newest first.
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[1].id, 1);
    }

    #[tokio::test]
    async fn test_transfer_commits_both_sides_and_both_entries() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(100.0))).await.unwrap();
        store.insert(account("2", "bob", dec!(5.0))).await.unwrap();

        let (source, destination) = store
            .transfer(
                "1",
                "2",
                Amount::new(dec!(30.0)).unwrap(),
                entry("1", EntryKind::Transfer, dec!(30.0)),
                entry("2", EntryKind::Received, dec!(30.0)),
            )
            .await
            .unwrap();
        assert_eq!(source, Balance::new(dec!(70.0)));
        assert_eq!(destination, Balance::new(dec!(35.0)));

        let all = store.query_all(&LedgerFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_touches_nothing() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(10.0))).await.unwrap();
        store.insert(account("2", "bob", dec!(5.0))).await.unwrap();

        let result = store
            .transfer(
                "1",
                "2",
                Amount::new(dec!(30.0)).unwrap(),
                entry("1", EntryKind::Transfer, dec!(30.0)),
                entry("2", EntryKind::Received, dec!(30.0)),
            )
            .await;
        assert!(matches!(result, Err(BankError::InsufficientFunds)));

        let alice = store.get_by_account_number("1").await.unwrap().unwrap();
        let bob = store.get_by_account_number("2").await.unwrap().unwrap();
        assert_eq!(alice.balance, Balance::new(dec!(10.0)));
        assert_eq!(bob.balance, Balance::new(dec!(5.0)));
        assert!(store.query_all(&LedgerFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_rejects_same_account() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(100.0))).await.unwrap();

        let result = store
            .transfer(
                "1",
                "1",
                Amount::new(dec!(30.0)).unwrap(),
                entry("1", EntryKind::Transfer, dec!(30.0)),
                entry("1", EntryKind::Received, dec!(30.0)),
            )
            .await;
        assert!(matches!(result, Err(BankError::Validation(_))));
    }

    #[tokio::test]
    async fn test_recent_limits_and_orders() {
        let store = InMemoryBankStore::new();
        store.insert(account("1", "alice", dec!(0))).await.unwrap();
        for i in 1..=5u32 {
            let amount = Decimal::from(i);
            store
                .apply(
                    "1",
                    BalanceChange::Credit(Amount::new(amount).unwrap()),
                    entry("1", EntryKind::Deposit, amount),
                )
                .await
                .unwrap();
        }

        let recent = store.recent("1", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].amount.value(), dec!(5));
        assert_eq!(recent[2].amount.value(), dec!(3));
    }

    #[tokio::test]
    async fn test_staged_transfer_pop_is_exactly_once() {
        let store = InMemoryTransferStore::new();
        store
            .put(StagedTransfer {
                sender: "alice".to_string(),
                source_account: "1".to_string(),
                destination_account: "2".to_string(),
                destination_name: "Bob".to_string(),
                amount: Amount::new(dec!(30.0)).unwrap(),
                created_at: NaiveDate::from_ymd_opt(2026, 1, 15)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
            })
            .await
            .unwrap();

        assert!(store.remove("alice").await.unwrap().is_some());
        assert!(store.remove("alice").await.unwrap().is_none());
    }
}
