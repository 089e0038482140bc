//! SHA-2 hash selection shared by the MAC and RSA layers.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// SHA-2 variant used by a MAC or signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashType {
    /// SHA-256 (32-byte digest).
    Sha256,
    /// SHA-384 (48-byte digest).
    Sha384,
    /// SHA-512 (64-byte digest).
    Sha512,
}

impl HashType {
    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            HashType::Sha256 => 32,
            HashType::Sha384 => 48,
            HashType::Sha512 => 64,
        }
    }

    /// Hash `data` in one shot.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashType::Sha256 => Sha256::digest(data).to_vec(),
            HashType::Sha384 => Sha384::digest(data).to_vec(),
            HashType::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl std::str::FromStr for HashType {
    type Err = common::SealError;

    /// Accepts `SHA256`, `SHA384`, `SHA512` (case-insensitive, `-` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(HashType::Sha256),
            "SHA384" => Ok(HashType::Sha384),
            "SHA512" => Ok(HashType::Sha512),
            _ => Err(common::SealError::config(format!("unsupported hash: {s}"))),
        }
    }
}
