//! Encrypt-then-authenticate AEAD composition.
//!
//! ```text
//! ciphertext = cipher.encrypt(plaintext)                 // iv || ct
//! tag        = mac(aad || ciphertext || be64(8 * |aad|))
//! output     = ciphertext || tag
//! ```
//!
//! The trailing 64-bit big-endian bit length of the associated data pins the
//! boundary between `aad` and `ciphertext`, so no two distinct pairs share a
//! MAC input. This layout matches draft-mcgrew-aead-aes-cbc-hmac-sha2 and is
//! part of the wire contract.
//!
//! On decrypt the tag is verified before the cipher sees a single byte.

use common::{Result, SealError};
use tracing::debug;

use super::cipher::{AesCtrCipher, IndCpaCipher};
use super::hash::HashType;
use super::mac::{HmacEngine, MacEngine};

/// Authenticated encryption with associated data.
pub trait Aead {
    /// Encrypt `plaintext`, binding `associated_data` into the tag.
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;

    /// Authenticate and decrypt.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::VerificationFailure`] if the input is truncated or
    /// the tag does not match; no plaintext is produced in that case.
    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Combines an [`IndCpaCipher`] and a [`MacEngine`] into an [`Aead`].
#[derive(Debug)]
pub struct EncryptThenAuthenticate<C = AesCtrCipher, M = HmacEngine> {
    cipher: C,
    mac: M,
    tag_len: usize,
}

impl<C: IndCpaCipher, M: MacEngine> EncryptThenAuthenticate<C, M> {
    /// Compose `cipher` and `mac`; the tag length is the MAC's configured length.
    pub fn new(cipher: C, mac: M) -> Self {
        let tag_len = mac.tag_len();
        Self {
            cipher,
            mac,
            tag_len,
        }
    }

    /// Length of the trailing tag.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }
}

impl EncryptThenAuthenticate<AesCtrCipher, HmacEngine> {
    /// AES-CTR + HMAC-SHA2, the standard instantiation.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] if either key or the IV/tag
    /// length is outside policy.
    pub fn aes_ctr_hmac(
        enc_key: &[u8],
        iv_len: usize,
        mac_key: &[u8],
        hash: HashType,
        tag_len: usize,
    ) -> Result<Self> {
        let cipher = AesCtrCipher::new(enc_key, iv_len)?;
        let mac = HmacEngine::new(hash, mac_key, tag_len)?;
        Ok(Self::new(cipher, mac))
    }
}

/// Build the MAC input `aad || ciphertext || be64(8 * |aad|)`.
fn bind(associated_data: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let aad_bits = (associated_data.len() as u64).wrapping_mul(8);
    let mut bound = Vec::with_capacity(associated_data.len() + ciphertext.len() + 8);
    bound.extend_from_slice(associated_data);
    bound.extend_from_slice(ciphertext);
    bound.extend_from_slice(&aad_bits.to_be_bytes());
    bound
}

impl<C: IndCpaCipher, M: MacEngine> Aead for EncryptThenAuthenticate<C, M> {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let mut ciphertext = self.cipher.encrypt(plaintext)?;
        let tag = self.mac.compute_mac(&bind(associated_data, &ciphertext))?;
        ciphertext.extend_from_slice(&tag);
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < self.tag_len {
            debug!("aead input shorter than tag");
            return Err(SealError::VerificationFailure);
        }
        let (body, tag) = ciphertext.split_at(ciphertext.len() - self.tag_len);
        if self
            .mac
            .verify_mac(tag, &bind(associated_data, body))
            .is_err()
        {
            debug!("aead tag rejected");
            return Err(SealError::VerificationFailure);
        }
        self.cipher.decrypt(body)
    }
}
