//! Error types shared across crates.

use thiserror::Error;

/// Reason an authenticated token was refused by the claim validator.
///
/// These are only ever produced after the signature or tag has verified, so
/// they are allowed to be specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimViolation {
    /// `exp` is at or before the validator's clock (minus skew).
    #[error("token has expired")]
    Expired,

    /// `nbf` is after the validator's clock (plus skew).
    #[error("token is not yet valid")]
    NotYetValid,

    /// An audience was expected but the token carries none.
    #[error("token has no audience claim")]
    MissingAudience,

    /// The token carries audiences but the validator expects none.
    #[error("token has an audience claim but no audience is expected")]
    UnexpectedAudience,

    /// The expected audience is not among the token's audiences.
    #[error("expected audience not found in token")]
    AudienceMismatch,
}

/// Top-level error type for every tokenseal operation.
///
/// Variants map to process exit codes used by `sealtool`:
/// - [`SealError::Format`] → 65
/// - [`SealError::AlgorithmMismatch`] → 66
/// - [`SealError::VerificationFailure`] → 67
/// - [`SealError::ClaimValidation`] → 68
/// - [`SealError::KeyConstruction`] → 69
/// - [`SealError::Configuration`] → 78
#[derive(Debug, Error)]
pub enum SealError {
    /// Malformed segment count, base64url or JSON.
    #[error("malformed input: {0}")]
    Format(&'static str),

    /// Header `alg`/`typ` does not match the engine, or the algorithm is unknown.
    #[error("algorithm mismatch: {0}")]
    AlgorithmMismatch(String),

    /// Tag or signature did not authenticate.
    ///
    /// Deliberately carries no detail: truncation, bit flips and wrong keys
    /// all land here.
    #[error("verification failed")]
    VerificationFailure,

    /// The token authenticated but its claims were refused.
    #[error("claim validation failed: {0}")]
    ClaimValidation(#[from] ClaimViolation),

    /// Key too short, below policy floor, failed self-test or unsupported.
    #[error("key construction failed: {0}")]
    KeyConstruction(String),

    /// Reserved claim set through the custom accessor, or invalid options.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl SealError {
    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SealError::Format(_) => 65,
            SealError::AlgorithmMismatch(_) => 66,
            SealError::VerificationFailure => 67,
            SealError::ClaimValidation(_) => 68,
            SealError::KeyConstruction(_) => 69,
            SealError::Configuration(_) => 78,
        }
    }

    /// Shorthand for [`SealError::KeyConstruction`].
    pub fn key(msg: impl Into<String>) -> Self {
        SealError::KeyConstruction(msg.into())
    }

    /// Shorthand for [`SealError::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        SealError::Configuration(msg.into())
    }
}

/// Result type alias for tokenseal operations.
pub type Result<T> = std::result::Result<T, SealError>;
