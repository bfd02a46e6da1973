use crate::domain::account::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counterparty recorded on manual credits made from the admin console.
pub const ADMIN_COUNTERPARTY: &str = "BANK-ADMIN";

/// Number of ledger entries included in a mini statement.
pub const STATEMENT_ROWS: usize = 20;

/// Timestamps are persisted second-granular, matching the ledger's
/// storage contract.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum EntryKind {
    Deposit,
    Withdraw,
    Transfer,
    Received,
    #[serde(rename = "Admin Deposit")]
    AdminDeposit,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Deposit => "Deposit",
            EntryKind::Withdraw => "Withdraw",
            EntryKind::Transfer => "Transfer",
            EntryKind::Received => "Received",
            EntryKind::AdminDeposit => "Admin Deposit",
        };
        write!(f, "{label}")
    }
}

/// One append-only record of a committed balance change.
///
/// Entries are never mutated or deleted. Transfers always append a mirrored
/// pair: kind `Transfer` on the source account and `Received` on the
/// destination, with the same timestamp and cross-referenced account
/// numbers in `counterparty`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LedgerEntry {
    /// Assigned by the store on commit; callers pass 0.
    pub id: u64,
    pub account_number: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Amount,
    #[serde(rename = "receiver")]
    pub counterparty: Option<String>,
    #[serde(
        rename = "date",
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_date"
    )]
    pub date: NaiveDateTime,
}

pub(crate) fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
}

impl LedgerEntry {
    pub fn new(
        account_number: &str,
        kind: EntryKind,
        amount: Amount,
        counterparty: Option<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            account_number: account_number.to_string(),
            kind,
            amount,
            counterparty,
            date,
        }
    }

    /// True if the entry satisfies every filter that is set.
    pub fn matches(&self, filter: &LedgerFilter) -> bool {
        if let Some(kind) = filter.kind
            && self.kind != kind
        {
            return false;
        }
        if let Some(from) = filter.date_from
            && self.date.date() < from
        {
            return false;
        }
        if let Some(to) = filter.date_to
            && self.date.date() > to
        {
            return false;
        }
        if let Some(min) = filter.min_amount
            && self.amount.value() < min
        {
            return false;
        }
        if let Some(max) = filter.max_amount
            && self.amount.value() > max
        {
            return false;
        }
        if let Some(needle) = &filter.counterparty {
            match &self.counterparty {
                Some(counterparty) if counterparty.contains(needle.as_str()) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &filter.account
            && !self.account_number.contains(needle.as_str())
        {
            return false;
        }
        true
    }
}

/// Optional ledger query filters. All bounds are inclusive; the date range
/// is day-granular (`date_from` starts at 00:00:00, `date_to` ends at
/// 23:59:59). `account` only applies to queries across all accounts.
#[derive(Debug, Default, Clone)]
pub struct LedgerFilter {
    pub kind: Option<EntryKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub counterparty: Option<String>,
    pub account: Option<String>,
}

/// Mini-statement data contract: the last [`STATEMENT_ROWS`] ledger entries,
/// newest first. Rendering (PDF layout etc.) is the caller's concern.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Statement {
    pub account_number: String,
    pub holder_name: String,
    #[serde(serialize_with = "serialize_date")]
    pub generated_at: NaiveDateTime,
    pub rows: Vec<LedgerEntry>,
}
