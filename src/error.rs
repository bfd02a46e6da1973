use thiserror::Error;

/// Error taxonomy for the banking core.
///
/// Validation problems are correctable by the caller, authorization failures
/// never reveal which credential was wrong, and the challenge outcomes
/// (`Expired`, `AttemptsExhausted`, `IncorrectCode`) mirror the
/// one-time-code state machine. Messages never carry internal identifiers.
#[derive(Error, Debug)]
pub enum BankError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("authorization error: {0}")]
    Authorization(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("state error: {0}")]
    State(String),
    #[error("code expired")]
    Expired,
    #[error("too many incorrect attempts, code invalidated")]
    AttemptsExhausted,
    #[error("incorrect code, attempts left: {remaining}")]
    IncorrectCode { remaining: u32 },
    #[error("insufficient balance")]
    InsufficientFunds,
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, BankError>;
