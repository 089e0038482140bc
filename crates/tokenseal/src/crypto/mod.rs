//! Symmetric primitives and the encrypt-then-authenticate composition.
//!
//! This module is free of any token or JSON concerns. The JWT layer reuses
//! [`mac::HmacEngine`] and [`hash::HashType`]; nothing here depends on `jwt`.
//!
//! # Ciphertext format
//!
//! ```text
//! iv || aes-ctr(plaintext) || hmac(aad || iv || ct || be64(8 * |aad|))[..tag_len]
//! ```

pub mod aead;
pub mod cipher;
pub mod hash;
pub mod mac;

pub use aead::{Aead, EncryptThenAuthenticate};
pub use cipher::{AesCtrCipher, IndCpaCipher};
pub use hash::HashType;
pub use mac::{HmacEngine, MacEngine};
