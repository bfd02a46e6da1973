use crate::error::BankError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Represents a monetary value held by an account.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for operations.
///
/// Ensures that operation amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, BankError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(BankError::Validation("amount must be positive".to_string()))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = BankError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Implement basic arithmetic for Balance to make it a usable Value Object
impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

fn default_profile() -> String {
    "default.png".to_string()
}

/// A customer account as persisted by the account store.
///
/// `account_number` is the immutable primary key; `username`, `email` and
/// `phone` are each unique across all accounts and any of them resolves the
/// account during login. The balance is mutated only by committed operations
/// and always equals the sum of the account's ledger entries.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub account_number: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub age: i32,
    pub address: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    pub balance: Balance,
    pub upi_pin: String,
}

impl Account {
    /// True if `identifier` equals the username, email or phone.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier || self.phone == identifier
    }

    /// Credits the balance unconditionally.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    /// Debits the balance if sufficient funds are available.
    pub fn debit(&mut self, amount: Amount) -> Result<(), BankError> {
        if self.balance >= amount.into() {
            self.balance -= amount.into();
            Ok(())
        } else {
            Err(BankError::InsufficientFunds)
        }
    }
}

/// Registration input, before an account number is assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub address: String,
    pub username: String,
    pub password: String,
    pub upi_pin: String,
}

/// Administrative projection of an account, without credential fields.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct AccountSummary {
    pub account_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub balance: Balance,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            balance: account.balance,
        }
    }
}

/// A balance adjustment applied by the store inside its transactional
/// boundary. `Debit` re-validates available funds against the freshly read
/// balance before mutating it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BalanceChange {
    Credit(Amount),
    Debit(Amount),
}
