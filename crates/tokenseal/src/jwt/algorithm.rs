//! JWS algorithm identifiers.

use std::fmt;
use std::str::FromStr;

use common::SealError;

use crate::crypto::HashType;

/// Signing family an [`Algorithm`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// HMAC-SHA2 (`HS*`).
    Hmac,
    /// ECDSA over a NIST curve with IEEE P1363 signatures (`ES*`).
    Ecdsa,
    /// RSASSA-PKCS1-v1_5 (`RS*`).
    RsaPkcs1,
    /// RSASSA-PSS with MGF1 and salt length equal to the hash length (`PS*`).
    RsaPss,
}

/// A JWS `alg` value supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Hs256,
    Hs384,
    Hs512,
    Es256,
    Es384,
    Es512,
    Rs256,
    Rs384,
    Rs512,
    Ps256,
    Ps384,
    Ps512,
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Algorithm; 12] = [
        Algorithm::Hs256,
        Algorithm::Hs384,
        Algorithm::Hs512,
        Algorithm::Es256,
        Algorithm::Es384,
        Algorithm::Es512,
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Ps256,
        Algorithm::Ps384,
        Algorithm::Ps512,
    ];

    /// The identifier written to the header `alg` field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::Es256 => "ES256",
            Algorithm::Es384 => "ES384",
            Algorithm::Es512 => "ES512",
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Ps256 => "PS256",
            Algorithm::Ps384 => "PS384",
            Algorithm::Ps512 => "PS512",
        }
    }

    /// Family that decides which engine and key type can carry this algorithm.
    pub const fn family(self) -> Family {
        match self {
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => Family::Hmac,
            Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => Family::Ecdsa,
            Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => Family::RsaPkcs1,
            Algorithm::Ps256 | Algorithm::Ps384 | Algorithm::Ps512 => Family::RsaPss,
        }
    }

    /// Hash used for the MAC or the signature digest.
    pub const fn hash(self) -> HashType {
        match self {
            Algorithm::Hs256 | Algorithm::Es256 | Algorithm::Rs256 | Algorithm::Ps256 => {
                HashType::Sha256
            }
            Algorithm::Hs384 | Algorithm::Es384 | Algorithm::Rs384 | Algorithm::Ps384 => {
                HashType::Sha384
            }
            Algorithm::Hs512 | Algorithm::Es512 | Algorithm::Rs512 | Algorithm::Ps512 => {
                HashType::Sha512
            }
        }
    }
}

impl FromStr for Algorithm {
    type Err = SealError;

    /// Case-sensitive: `"hs256"` is not `"HS256"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| SealError::AlgorithmMismatch(format!("unknown algorithm: {s}")))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
