//! AES-CTR bulk encryption with an IV prefix.
//!
//! **Confidentiality only.** The output is malleable; it must be wrapped by
//! [`EncryptThenAuthenticate`](super::aead::EncryptThenAuthenticate) before use.

use aes::{Aes128, Aes256};
use common::{Result, SealError};
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// AES block length; also the maximum IV length.
pub const BLOCK_LEN: usize = 16;

/// Shortest IV accepted.
pub const MIN_IV_LEN: usize = 12;

/// A cipher secure against chosen-plaintext attacks, with no integrity.
///
/// `encrypt` returns `iv || ciphertext`; `decrypt` consumes the same layout.
#[cfg_attr(test, mockall::automock)]
pub trait IndCpaCipher {
    /// Encrypt under a fresh random IV.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt an IV-prefixed ciphertext.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// AES-128/256 in counter mode.
///
/// The IV is zero-padded on the right to form the initial 128-bit big-endian
/// counter block.
pub struct AesCtrCipher {
    key: Zeroizing<Vec<u8>>,
    iv_len: usize,
}

impl AesCtrCipher {
    /// Build a cipher for a 16- or 32-byte key and an IV of
    /// [`MIN_IV_LEN`]..=[`BLOCK_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] on any other key or IV size.
    pub fn new(key: &[u8], iv_len: usize) -> Result<Self> {
        if key.len() != 16 && key.len() != 32 {
            return Err(SealError::key(format!(
                "invalid AES key length {}: expected 16 or 32 bytes",
                key.len()
            )));
        }
        if !(MIN_IV_LEN..=BLOCK_LEN).contains(&iv_len) {
            return Err(SealError::key(format!(
                "invalid IV length {iv_len}: expected {MIN_IV_LEN}..={BLOCK_LEN} bytes"
            )));
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            iv_len,
        })
    }

    /// Configured IV length in bytes.
    pub fn iv_len(&self) -> usize {
        self.iv_len
    }

    fn apply_keystream(&self, iv: &[u8], buf: &mut [u8]) -> Result<()> {
        let mut counter = [0u8; BLOCK_LEN];
        counter[..iv.len()].copy_from_slice(iv);
        let bad_key = |_| SealError::key("AES rejected key");
        match self.key.len() {
            16 => Aes128Ctr::new_from_slices(&self.key, &counter)
                .map_err(bad_key)?
                .apply_keystream(buf),
            _ => Aes256Ctr::new_from_slices(&self.key, &counter)
                .map_err(bad_key)?
                .apply_keystream(buf),
        }
        Ok(())
    }
}

impl IndCpaCipher for AesCtrCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.iv_len + plaintext.len()];
        let (iv, body) = out.split_at_mut(self.iv_len);
        OsRng.fill_bytes(iv);
        body.copy_from_slice(plaintext);
        self.apply_keystream(iv, body)?;
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < self.iv_len {
            return Err(SealError::Format("ciphertext too short"));
        }
        let (iv, body) = ciphertext.split_at(self.iv_len);
        let mut plaintext = body.to_vec();
        self.apply_keystream(iv, &mut plaintext)?;
        Ok(plaintext)
    }
}

impl std::fmt::Debug for AesCtrCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesCtrCipher")
            .field("key_bits", &(self.key.len() * 8))
            .field("iv_len", &self.iv_len)
            .finish_non_exhaustive()
    }
}
