use crate::domain::challenge::{Challenge, ChallengePayload, ChallengePurpose};
use crate::domain::ports::{ChallengeStoreBox, ClockRef};
use crate::error::{BankError, Result};
use chrono::Duration;
use rand::Rng;
use tokio::sync::Mutex;

/// How long an issued code stays valid.
pub const OTP_TTL_SECONDS: i64 = 300;
/// Incorrect submissions allowed before a challenge is destroyed.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Issues and verifies one-time codes.
///
/// Single-use, single-purpose, bounded-attempt challenges: a code verifies
/// at most once, only for the purpose it was issued for, and survives at
/// most [`MAX_OTP_ATTEMPTS`] wrong guesses within its TTL. The registry
/// never delivers anything itself; the caller owns out-of-band delivery.
///
/// `issue` and `verify` serialize through one async lock, so the
/// read-increment-write on the attempt counter cannot interleave between
/// concurrent verifications of the same identifier.
pub struct ChallengeRegistry {
    store: ChallengeStoreBox,
    clock: ClockRef,
    guard: Mutex<()>,
}

impl ChallengeRegistry {
    pub fn new(store: ChallengeStoreBox, clock: ClockRef) -> Self {
        Self {
            store,
            clock,
            guard: Mutex::new(()),
        }
    }

    /// Generates a random six-digit code and stores a fresh challenge under
    /// `identifier`, unconditionally replacing any previous one.
    pub async fn issue(
        &self,
        identifier: &str,
        purpose: ChallengePurpose,
        payload: ChallengePayload,
    ) -> Result<String> {
        let _guard = self.guard.lock().await;
        let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        let now = self.clock.now();
        self.store
            .put(Challenge {
                identifier: identifier.to_string(),
                code: code.clone(),
                purpose,
                created_at: now,
                expires_at: now + Duration::seconds(OTP_TTL_SECONDS),
                attempts: 0,
                payload,
            })
            .await?;
        Ok(code)
    }

    /// Verifies a submitted code and, on success, consumes the challenge
    /// and releases its payload.
    ///
    /// Failure ladder: no challenge, purpose mismatch (challenge left
    /// intact), expiry (challenge deleted), attempt ceiling reached
    /// (deleted), incorrect code (attempt counter incremented in place).
    pub async fn verify(
        &self,
        identifier: &str,
        submitted: &str,
        expected_purpose: ChallengePurpose,
    ) -> Result<ChallengePayload> {
        let _guard = self.guard.lock().await;
        let Some(mut challenge) = self.store.get(identifier).await? else {
            return Err(BankError::NotFound(
                "code not requested or already used".to_string(),
            ));
        };
        if challenge.purpose != expected_purpose {
            return Err(BankError::State(
                "code was issued for a different action".to_string(),
            ));
        }
        if self.clock.now() > challenge.expires_at {
            self.store.remove(identifier).await?;
            return Err(BankError::Expired);
        }
        if challenge.attempts >= MAX_OTP_ATTEMPTS {
            self.store.remove(identifier).await?;
            return Err(BankError::AttemptsExhausted);
        }
        if challenge.code == submitted.trim() {
            self.store.remove(identifier).await?;
            return Ok(challenge.payload);
        }
        challenge.attempts += 1;
        let remaining = MAX_OTP_ATTEMPTS - challenge.attempts;
        self.store.put(challenge).await?;
        Err(BankError::IncorrectCode { remaining })
    }
}
