//! HMAC tagging with optional truncation.

use common::{Result, SealError};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::hash::HashType;

/// Shortest HMAC key accepted.
pub const MIN_KEY_LEN: usize = 16;

/// Shortest tag an engine may be truncated to.
pub const MIN_TAG_LEN: usize = 10;

/// Computes and verifies authentication tags under a key fixed at construction.
pub trait MacEngine {
    /// Compute the (possibly truncated) tag over `data`.
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Verify `tag` over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::VerificationFailure`] for a wrong length, a wrong
    /// value, or any internal error. Callers cannot tell these apart.
    fn verify_mac(&self, tag: &[u8], data: &[u8]) -> Result<()>;

    /// Length of the tags produced by [`MacEngine::compute_mac`].
    fn tag_len(&self) -> usize;
}

/// HMAC-SHA2 engine.
pub struct HmacEngine {
    hash: HashType,
    key: Zeroizing<Vec<u8>>,
    tag_len: usize,
}

impl HmacEngine {
    /// Build an engine producing `tag_len`-byte tags.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] if the key is shorter than
    /// [`MIN_KEY_LEN`] or `tag_len` is outside `MIN_TAG_LEN..=digest size`.
    pub fn new(hash: HashType, key: &[u8], tag_len: usize) -> Result<Self> {
        if key.len() < MIN_KEY_LEN {
            return Err(SealError::key(format!(
                "HMAC key too short: need at least {MIN_KEY_LEN} bytes"
            )));
        }
        if tag_len < MIN_TAG_LEN || tag_len > hash.output_len() {
            return Err(SealError::key(format!(
                "invalid HMAC tag length {tag_len} for {hash:?}"
            )));
        }
        Ok(Self {
            hash,
            key: Zeroizing::new(key.to_vec()),
            tag_len,
        })
    }

    /// Build an engine whose tags are the full digest length.
    pub fn untruncated(hash: HashType, key: &[u8]) -> Result<Self> {
        Self::new(hash, key, hash.output_len())
    }

    /// The underlying hash.
    pub fn hash(&self) -> HashType {
        self.hash
    }

    fn full_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let invalid = |_| SealError::key("HMAC rejected key");
        let tag = match self.hash {
            HashType::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(&self.key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashType::Sha384 => {
                let mut mac = Hmac::<Sha384>::new_from_slice(&self.key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashType::Sha512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(&self.key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(tag)
    }
}

impl MacEngine for HmacEngine {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut tag = self.full_mac(data)?;
        tag.truncate(self.tag_len);
        Ok(tag)
    }

    fn verify_mac(&self, tag: &[u8], data: &[u8]) -> Result<()> {
        let expected = self
            .compute_mac(data)
            .map_err(|_| SealError::VerificationFailure)?;
        // ct_eq on slices of different length yields false without a data-dependent branch.
        if bool::from(expected.as_slice().ct_eq(tag)) {
            Ok(())
        } else {
            Err(SealError::VerificationFailure)
        }
    }

    fn tag_len(&self) -> usize {
        self.tag_len
    }
}

impl std::fmt::Debug for HmacEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacEngine")
            .field("hash", &self.hash)
            .field("tag_len", &self.tag_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HmacEngine {
        HmacEngine::new(HashType::Sha256, &[7u8; 32], 16).unwrap()
    }

    #[test]
    fn roundtrip() {
        let mac = engine();
        let tag = mac.compute_mac(b"message").unwrap();
        assert_eq!(tag.len(), 16);
        assert!(mac.verify_mac(&tag, b"message").is_ok());
    }

    #[test]
    fn wrong_message_rejected() {
        let mac = engine();
        let tag = mac.compute_mac(b"message 1").unwrap();
        assert!(matches!(
            mac.verify_mac(&tag, b"message 2"),
            Err(SealError::VerificationFailure)
        ));
    }

    #[test]
    fn wrong_key_rejected() {
        let a = engine();
        let b = HmacEngine::new(HashType::Sha256, &[8u8; 32], 16).unwrap();
        let tag = a.compute_mac(b"message").unwrap();
        assert!(b.verify_mac(&tag, b"message").is_err());
    }

    #[test]
    fn truncated_tag_is_prefix_of_full_tag() {
        let full = HmacEngine::untruncated(HashType::Sha512, &[1u8; 32]).unwrap();
        let short = HmacEngine::new(HashType::Sha512, &[1u8; 32], 32).unwrap();
        let a = full.compute_mac(b"x").unwrap();
        let b = short.compute_mac(b"x").unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(&a[..32], b.as_slice());
    }

    #[test]
    fn full_length_tag_rejected_by_truncating_engine() {
        let full = HmacEngine::untruncated(HashType::Sha256, &[7u8; 32]).unwrap();
        let tag = full.compute_mac(b"message").unwrap();
        assert!(engine().verify_mac(&tag, b"message").is_err());
    }

    #[test]
    fn empty_tag_rejected() {
        assert!(engine().verify_mac(&[], b"message").is_err());
    }

    #[test]
    fn short_key_rejected() {
        assert!(matches!(
            HmacEngine::new(HashType::Sha256, &[0u8; 15], 16),
            Err(SealError::KeyConstruction(_))
        ));
    }

    #[test]
    fn tag_length_bounds() {
        assert!(HmacEngine::new(HashType::Sha256, &[0u8; 16], 9).is_err());
        assert!(HmacEngine::new(HashType::Sha256, &[0u8; 16], 33).is_err());
        assert!(HmacEngine::new(HashType::Sha256, &[0u8; 16], 10).is_ok());
        assert!(HmacEngine::new(HashType::Sha384, &[0u8; 16], 48).is_ok());
    }

    #[test]
    fn debug_redacts_key() {
        let s = format!("{:?}", HmacEngine::new(HashType::Sha256, &[0xAB; 16], 16).unwrap());
        assert!(!s.contains("171"));
        assert!(!s.to_lowercase().contains("ab, ab"));
    }
}
