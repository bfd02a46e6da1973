use super::account::{Account, Amount, Balance, BalanceChange};
use super::challenge::Challenge;
use super::ledger::{LedgerEntry, LedgerFilter};
use super::transfer::StagedTransfer;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates the account, enforcing uniqueness of account number,
    /// username, email and phone.
    async fn insert(&self, account: Account) -> Result<()>;
    /// Field-targeted credential updates. These deliberately avoid a
    /// whole-account upsert so they cannot clobber a concurrently
    /// committed balance.
    async fn set_password(&self, email: &str, password: &str) -> Result<()>;
    async fn set_upi_pin(&self, email: &str, upi_pin: &str) -> Result<()>;
    /// Resolves an account by username, email or phone. The three
    /// namespaces are kept collision-free at creation time, so at most one
    /// account can match.
    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<Account>>;
    async fn get_by_account_number(&self, account_number: &str) -> Result<Option<Account>>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Entries for one account matching the filter, newest first.
    async fn query(&self, account_number: &str, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>>;
    /// Entries across all accounts matching the filter, newest first.
    async fn query_all(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>>;
    /// The most recent `limit` entries for one account, newest first.
    async fn recent(&self, account_number: &str, limit: usize) -> Result<Vec<LedgerEntry>>;
}

/// The persistence capability consumed by the orchestrator.
///
/// The two commit operations are the only way balances change, and each is
/// a single all-or-nothing unit: the balance update(s) and the ledger
/// entry(ies) land together or not at all, with the funds check repeated
/// against the freshly read balance inside the store's own exclusion
/// boundary.
#[async_trait]
pub trait BankStore: AccountStore + LedgerStore {
    /// Applies one balance change and appends its ledger entry atomically.
    /// Returns the balance after the change.
    async fn apply(
        &self,
        account_number: &str,
        change: BalanceChange,
        entry: LedgerEntry,
    ) -> Result<Balance>;

    /// Moves `amount` from `source` to `destination` and appends the
    /// mirrored entry pair, all as one unit. Fails with `InsufficientFunds`
    /// (leaving every row untouched) if the source balance dropped below
    /// `amount` since the caller last read it. Returns the new source and
    /// destination balances.
    async fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Amount,
        debit_entry: LedgerEntry,
        credit_entry: LedgerEntry,
    ) -> Result<(Balance, Balance)>;
}

/// Keyed challenge storage: one live challenge per identifier.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Inserts or replaces the challenge under its identifier.
    async fn put(&self, challenge: Challenge) -> Result<()>;
    async fn get(&self, identifier: &str) -> Result<Option<Challenge>>;
    /// Removes and returns the challenge, if any.
    async fn remove(&self, identifier: &str) -> Result<Option<Challenge>>;
}

/// Keyed staged-transfer storage: one pending transfer per sender.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Inserts or replaces the staged transfer under its sender.
    async fn put(&self, transfer: StagedTransfer) -> Result<()>;
    async fn get(&self, sender: &str) -> Result<Option<StagedTransfer>>;
    /// Removes and returns the staged transfer, if any. This pop is the
    /// consumption point: concurrent confirmations race on it and exactly
    /// one caller receives the entry.
    async fn remove(&self, sender: &str) -> Result<Option<StagedTransfer>>;
}

/// Out-of-band message delivery. Implementations report failure through the
/// returned flag and never propagate errors past this boundary.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Time source, injectable so expiry behavior is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub type BankStoreBox = Box<dyn BankStore>;
pub type ChallengeStoreBox = Box<dyn ChallengeStore>;
pub type TransferStoreBox = Box<dyn TransferStore>;
pub type NotifierBox = Box<dyn Notifier>;
pub type ClockRef = Arc<dyn Clock>;
