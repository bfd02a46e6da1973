#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use nova_bank::application::engine::BankEngine;
use nova_bank::domain::account::{Account, Balance, NewAccount};
use nova_bank::domain::ledger::{EntryKind, LedgerFilter};
use nova_bank::infrastructure::clock::ManualClock;
use nova_bank::infrastructure::in_memory::{
    InMemoryBankStore, InMemoryChallengeStore, InMemoryTransferStore,
};
use nova_bank::infrastructure::notifier::RecordingNotifier;
use nova_bank::domain::ports::AccountStore;
use rust_decimal::Decimal;
use std::sync::Arc;

pub const ADMIN_SECRET: &str = "sesame";
pub const DEFAULT_PIN: &str = "123456";

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub struct TestBank {
    pub engine: BankEngine,
    pub notifier: RecordingNotifier,
    pub clock: ManualClock,
    pub store: InMemoryBankStore,
    pub transfers: InMemoryTransferStore,
}

pub fn test_bank() -> TestBank {
    test_bank_with_notifier(RecordingNotifier::new())
}

pub fn test_bank_with_notifier(notifier: RecordingNotifier) -> TestBank {
    let store = InMemoryBankStore::new();
    let transfers = InMemoryTransferStore::new();
    let clock = ManualClock::starting_at(start_time());
    let engine = BankEngine::new(
        Box::new(store.clone()),
        Box::new(InMemoryChallengeStore::new()),
        Box::new(transfers.clone()),
        Box::new(notifier.clone()),
        Arc::new(clock.clone()),
        ADMIN_SECRET,
    );
    TestBank {
        engine,
        notifier,
        clock,
        store,
        transfers,
    }
}

pub async fn register(engine: &BankEngine, username: &str, name: &str) -> Account {
    engine
        .register(NewAccount {
            name: name.to_string(),
            email: format!("{username}@example.com"),
            phone: format!("555{username}"),
            dob: "1990-06-01".to_string(),
            address: String::new(),
            username: username.to_string(),
            password: format!("{username}-pw"),
            upi_pin: DEFAULT_PIN.to_string(),
        })
        .await
        .unwrap()
}

/// A submission guaranteed not to match the issued code.
pub fn wrong_code(code: &str) -> &'static str {
    if code == "000000" { "111111" } else { "000000" }
}

/// Checks the core invariant: the balance equals the signed sum of the
/// account's ledger entries.
pub async fn assert_balance_matches_ledger(bank: &TestBank, account_number: &str) {
    let entries = bank
        .engine
        .query_ledger(account_number, &LedgerFilter::default())
        .await
        .unwrap();
    let sum: Decimal = entries
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Deposit | EntryKind::Received | EntryKind::AdminDeposit => {
                entry.amount.value()
            }
            EntryKind::Withdraw | EntryKind::Transfer => -entry.amount.value(),
        })
        .sum();
    let account = bank
        .store
        .get_by_account_number(account_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        account.balance,
        Balance::new(sum),
        "balance diverged from ledger for {account_number}"
    );
}
