use crate::domain::account::{Amount, Balance};
use chrono::NaiveDateTime;

/// A transfer that passed pre-checks and is awaiting code confirmation.
///
/// At most one staged transfer exists per sender; staging again overwrites
/// the previous one. The entry is consumed exactly once when its paired
/// challenge verifies, and a stale entry (older than the challenge TTL) is
/// treated as absent and reaped lazily on next access.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedTransfer {
    /// Username of the initiating user.
    pub sender: String,
    pub source_account: String,
    pub destination_account: String,
    pub destination_name: String,
    pub amount: Amount,
    pub created_at: NaiveDateTime,
}

/// Outcome of a committed transfer, for the caller's confirmation view.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub amount: Amount,
    pub destination_account: String,
    pub destination_name: String,
    /// Sender balance after the debit.
    pub sender_balance: Balance,
    pub timestamp: NaiveDateTime,
}
