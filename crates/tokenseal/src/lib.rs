//! Authenticated encryption and compact signed tokens.
//!
//! - [`crypto`]: HMAC, AES-CTR and their encrypt-then-authenticate composition.
//! - [`jwt`]: compact JWS tokens over HMAC, ECDSA and RSA.
//!
//! Every engine is immutable after construction and can be shared across
//! threads. Verification failures are deliberately uninformative; see
//! [`SealError::VerificationFailure`].

pub mod crypto;
pub mod jwt;

pub use common::{ClaimViolation, Result, SealError};
