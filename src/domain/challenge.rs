use chrono::NaiveDateTime;

/// The closed set of sensitive actions a one-time code can authorize.
///
/// A code issued for one purpose never verifies for another, so a leaked
/// or replayed code cannot be redeemed against a different action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengePurpose {
    PasswordReset,
    TransferConfirm,
    PinChange,
}

/// Action-specific data carried by a challenge and released to the caller
/// only on successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengePayload {
    PasswordReset { username: String },
    TransferConfirm { sender: String },
    PinChange { username: String, new_pin: String },
}

/// A live one-time-code challenge.
///
/// At most one challenge exists per identifier at any time; issuing a new
/// one replaces the old unconditionally. The attempt counter is the only
/// field mutated in place, and the challenge is destroyed on successful
/// verification, on expiry detection, or once the attempt ceiling is hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Delivery identifier the code was sent to (the account email).
    pub identifier: String,
    /// Six-digit numeric code, compared by string equality.
    pub code: String,
    pub purpose: ChallengePurpose,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    /// Incorrect submissions so far.
    pub attempts: u32,
    pub payload: ChallengePayload,
}
