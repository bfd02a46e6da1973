use crate::domain::account::{Account, Amount, Balance, BalanceChange};
use crate::domain::ledger::{LedgerEntry, LedgerFilter};
use crate::domain::ports::{AccountStore, BankStore, LedgerStore};
use crate::error::{BankError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Column Family for account rows.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for ledger entries.
pub const CF_LEDGER: &str = "ledger";

impl From<rocksdb::Error> for BankError {
    fn from(error: rocksdb::Error) -> Self {
        BankError::Internal(Box::new(error))
    }
}

/// A persistent bank store backed by RocksDB.
///
/// Accounts are keyed by account number; ledger entries by their big-endian
/// id, so iteration order is ledger order and `IteratorMode::End` walks
/// newest first. Each commit is one `WriteBatch` (balance rows and ledger
/// rows land together or not at all), and all mutations serialize through a
/// store-level async mutex so the funds check inside `apply`/`transfer`
/// always sees the latest committed balance.
///
/// `Clone` shares the underlying `Arc<DB>` and the entry-id sequence.
#[derive(Clone)]
pub struct RocksDbBankStore {
    db: Arc<DB>,
    next_entry_id: Arc<AtomicU64>,
    write_lock: Arc<Mutex<()>>,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| BankError::Internal(Box::new(e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| BankError::Internal(Box::new(e)))
}

impl RocksDbBankStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist and recovering the ledger id sequence
    /// from the highest persisted entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_ledger])?;

        let mut next_entry_id = 1u64;
        if let Some(cf) = db.cf_handle(CF_LEDGER)
            && let Some(item) = db.iterator_cf(cf, IteratorMode::End).next()
        {
            let (key, _value) = item?;
            if key.len() == 8 {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&key);
                next_entry_id = u64::from_be_bytes(buf) + 1;
            }
        }

        Ok(Self {
            db: Arc::new(db),
            next_entry_id: Arc::new(AtomicU64::new(next_entry_id)),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            BankError::Internal(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read_account(&self, account_number: &str) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_cf(cf, account_number.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_accounts(&self) -> Result<Vec<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(decode(&value)?);
        }
        Ok(accounts)
    }

    fn batch_put_account(&self, batch: &mut WriteBatch, account: &Account) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        batch.put_cf(cf, account.account_number.as_bytes(), encode(account)?);
        Ok(())
    }

    /// Stamps the next sequence id on the entry and stages it in the batch.
    fn batch_put_entry(&self, batch: &mut WriteBatch, mut entry: LedgerEntry) -> Result<()> {
        entry.id = self.next_entry_id.fetch_add(1, Ordering::SeqCst);
        let cf = self.cf(CF_LEDGER)?;
        batch.put_cf(cf, entry.id.to_be_bytes(), encode(&entry)?);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for RocksDbBankStore {
    async fn insert(&self, account: Account) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let collision = self.scan_accounts()?.iter().any(|existing| {
            existing.account_number == account.account_number
                || existing.username == account.username
                || existing.email == account.email
                || existing.phone == account.phone
        });
        if collision {
            return Err(BankError::Validation(
                "username, email or phone already exists".to_string(),
            ));
        }
        let cf = self.cf(CF_ACCOUNTS)?;
        self.db
            .put_cf(cf, account.account_number.as_bytes(), encode(&account)?)?;
        Ok(())
    }

    async fn set_password(&self, email: &str, password: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut account = self
            .scan_accounts()?
            .into_iter()
            .find(|account| account.email == email)
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        account.password = password.to_string();
        let cf = self.cf(CF_ACCOUNTS)?;
        self.db
            .put_cf(cf, account.account_number.as_bytes(), encode(&account)?)?;
        Ok(())
    }

    async fn set_upi_pin(&self, email: &str, upi_pin: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut account = self
            .scan_accounts()?
            .into_iter()
            .find(|account| account.email == email)
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        account.upi_pin = upi_pin.to_string();
        let cf = self.cf(CF_ACCOUNTS)?;
        self.db
            .put_cf(cf, account.account_number.as_bytes(), encode(&account)?)?;
        Ok(())
    }

    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        Ok(self
            .scan_accounts()?
            .into_iter()
            .find(|account| account.matches_identifier(identifier)))
    }

    async fn get_by_account_number(&self, account_number: &str) -> Result<Option<Account>> {
        self.read_account(account_number)
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.scan_accounts()
    }
}

#[async_trait]
impl LedgerStore for RocksDbBankStore {
    async fn query(&self, account_number: &str, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf(CF_LEDGER)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End) {
            let (_key, value) = item?;
            let entry: LedgerEntry = decode(&value)?;
            if entry.account_number == account_number && entry.matches(filter) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn query_all(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf(CF_LEDGER)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End) {
            let (_key, value) = item?;
            let entry: LedgerEntry = decode(&value)?;
            if entry.matches(filter) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn recent(&self, account_number: &str, limit: usize) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf(CF_LEDGER)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End) {
            if entries.len() == limit {
                break;
            }
            let (_key, value) = item?;
            let entry: LedgerEntry = decode(&value)?;
            if entry.account_number == account_number {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl BankStore for RocksDbBankStore {
    async fn apply(
        &self,
        account_number: &str,
        change: BalanceChange,
        entry: LedgerEntry,
    ) -> Result<Balance> {
        let _guard = self.write_lock.lock().await;
        let mut account = self
            .read_account(account_number)?
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        match change {
            BalanceChange::Credit(amount) => account.credit(amount),
            BalanceChange::Debit(amount) => account.debit(amount)?,
        }
        let balance = account.balance;

        let mut batch = WriteBatch::default();
        self.batch_put_account(&mut batch, &account)?;
        self.batch_put_entry(&mut batch, entry)?;
        self.db.write(batch)?;
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
        let _guard = self.write_lock.lock().await;
        let mut source_account = self
            .read_account(source)?
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;
        let mut destination_account = self
            .read_account(destination)?
            .ok_or_else(|| BankError::NotFound("account not found".to_string()))?;

        source_account.debit(amount)?;
        destination_account.credit(amount);
        let balances = (source_account.balance, destination_account.balance);

        let mut batch = WriteBatch::default();
        self.batch_put_account(&mut batch, &source_account)?;
        self.batch_put_account(&mut batch, &destination_account)?;
        self.batch_put_entry(&mut batch, debit_entry)?;
        self.batch_put_entry(&mut batch, credit_entry)?;
        self.db.write(batch)?;
        Ok(balances)
    }
}
