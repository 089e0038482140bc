//! Common types, protocol definitions, and errors shared across `tokenseal` crates.

pub mod error;
pub mod protocol;

pub use error::{ClaimViolation, Result, SealError};
