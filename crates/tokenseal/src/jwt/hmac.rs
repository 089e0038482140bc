//! `HS256`/`HS384`/`HS512` tokens.

use common::{Result, SealError};

use super::algorithm::{Algorithm, Family};
use super::claims::RawJwt;
use super::format;
use super::validator::{JwtValidator, VerifiedJwt};
use crate::crypto::{HmacEngine, MacEngine};

/// Minimum key length for every HMAC token algorithm, independent of the
/// hash size.
pub const MIN_KEY_LEN: usize = 32;

/// Signs and verifies compact tokens with an untruncated HMAC.
#[derive(Debug)]
pub struct JwtHmac {
    algorithm: Algorithm,
    mac: HmacEngine,
}

impl JwtHmac {
    /// # Errors
    ///
    /// [`SealError::KeyConstruction`] if `key` is shorter than
    /// [`MIN_KEY_LEN`]; [`SealError::AlgorithmMismatch`] if `algorithm` is not
    /// an `HS*` algorithm.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        if key.len() < MIN_KEY_LEN {
            return Err(SealError::key(format!(
                "HMAC token key too short: need at least {MIN_KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        if algorithm.family() != Family::Hmac {
            return Err(SealError::AlgorithmMismatch(format!(
                "{algorithm} is not an HMAC algorithm"
            )));
        }
        let mac = HmacEngine::untruncated(algorithm.hash(), key)?;
        Ok(Self { algorithm, mac })
    }

    /// The `HS*` algorithm this engine signs and accepts.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign `raw` and return the compact token.
    pub fn create_compact(&self, raw: &RawJwt) -> Result<String> {
        let unsigned = format::create_unsigned_compact(self.algorithm, raw)?;
        let tag = self.mac.compute_mac(unsigned.as_bytes())?;
        Ok(format::create_signed_compact(&unsigned, &tag))
    }

    /// Authenticate `compact`, re-check its header, then apply `validator`.
    pub fn verify_compact(&self, compact: &str, validator: &JwtValidator) -> Result<VerifiedJwt> {
        format::verify_compact_with(self.algorithm, compact, validator, |data, tag| {
            self.mac.verify_mac(tag, data)
        })
    }
}
