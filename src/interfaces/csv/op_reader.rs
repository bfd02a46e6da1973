use crate::error::{BankError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// Operations accepted by the batch runner. The interactive flows
/// (transfers, PIN changes, password resets) are gated behind one-time
/// codes and cannot be batched.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
    Register,
    Deposit,
    Withdraw,
    AdminDeposit,
}

/// One row of the operations CSV. Which columns are required depends on
/// the operation; the rest stay empty.
#[derive(Debug, Deserialize, Clone)]
pub struct OperationRecord {
    pub op: OpKind,
    /// Username for `register`; username, email or phone elsewhere.
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Target account number for `admin-deposit`.
    #[serde(default)]
    pub account: Option<String>,
}

/// Reads operations from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<OperationRecord>`. It handles whitespace trimming and flexible
/// record lengths automatically.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes operations,
    /// so large files stream without loading into memory.
    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BankError::from))
    }
}
