//! `ES*`, `RS*` and `PS*` token engines.
//!
//! ECDSA signatures use the fixed-length IEEE P1363 encoding (`r || s`, each
//! padded to the field size): 64, 96 and 132 bytes for P-256, P-384 and P-521.

use common::{Result, SealError};
use p256::ecdsa::signature::{Signer, Verifier};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Sha256, Sha384, Sha512};

use super::algorithm::{Algorithm, Family};
use super::claims::RawJwt;
use super::format;
use super::keys::{JwtPrivateKey, JwtPublicKey};
use super::validator::{JwtValidator, VerifiedJwt};
use crate::crypto::HashType;

fn pkcs1v15(hash: HashType) -> Pkcs1v15Sign {
    match hash {
        HashType::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashType::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashType::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// PSS with MGF1 over the same hash and salt length equal to the hash length.
fn pss(hash: HashType) -> Pss {
    let salt_len = hash.output_len();
    match hash {
        HashType::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
        HashType::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
        HashType::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
    }
}

/// Signs compact tokens with a private key bound to one algorithm.
#[derive(Debug, Clone)]
pub struct JwtPublicKeySign {
    algorithm: Algorithm,
    key: JwtPrivateKey,
}

impl JwtPublicKeySign {
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] if `key` cannot carry
    /// `algorithm` (wrong curve, RSA key for ECDSA, modulus below policy).
    pub fn new(algorithm: Algorithm, key: JwtPrivateKey) -> Result<Self> {
        key.public_key().check_algorithm(algorithm)?;
        Ok(Self { algorithm, key })
    }

    /// The algorithm this engine signs with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The signing key.
    pub fn private_key(&self) -> &JwtPrivateKey {
        &self.key
    }

    /// A verifier for the matching public key and the same algorithm.
    pub fn public_key_verify(&self) -> Result<JwtPublicKeyVerify> {
        JwtPublicKeyVerify::new(self.algorithm, self.key.public_key())
    }

    /// Sign `raw` and return the compact token.
    pub fn create_compact(&self, raw: &RawJwt) -> Result<String> {
        let unsigned = format::create_unsigned_compact(self.algorithm, raw)?;
        let signature = self.sign(unsigned.as_bytes())?;
        Ok(format::create_signed_compact(&unsigned, &signature))
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let failed = |e: &dyn std::fmt::Display| SealError::key(format!("signing failed: {e}"));
        match &self.key {
            JwtPrivateKey::P256(k) => {
                let sig: p256::ecdsa::Signature = k.try_sign(data).map_err(|e| failed(&e))?;
                Ok(sig.to_bytes().to_vec())
            }
            JwtPrivateKey::P384(k) => {
                let sig: p384::ecdsa::Signature = k.try_sign(data).map_err(|e| failed(&e))?;
                Ok(sig.to_bytes().to_vec())
            }
            JwtPrivateKey::P521(k) => {
                let sig: p521::ecdsa::Signature = k.try_sign(data).map_err(|e| failed(&e))?;
                Ok(sig.to_bytes().to_vec())
            }
            JwtPrivateKey::Rsa(k) => {
                let hash = self.algorithm.hash();
                let digest = hash.digest(data);
                let signed = match self.algorithm.family() {
                    Family::RsaPkcs1 => k.sign(pkcs1v15(hash), &digest),
                    _ => k.sign_with_rng(&mut OsRng, pss(hash), &digest),
                };
                signed.map_err(|e| failed(&e))
            }
        }
    }
}

/// Verifies compact tokens with a public key bound to one algorithm.
#[derive(Debug, Clone)]
pub struct JwtPublicKeyVerify {
    algorithm: Algorithm,
    key: JwtPublicKey,
}

impl JwtPublicKeyVerify {
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] if `key` cannot carry
    /// `algorithm`.
    pub fn new(algorithm: Algorithm, key: JwtPublicKey) -> Result<Self> {
        key.check_algorithm(algorithm)?;
        Ok(Self { algorithm, key })
    }

    /// The only algorithm this engine accepts.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The verification key.
    pub fn public_key(&self) -> &JwtPublicKey {
        &self.key
    }

    /// Verify the signature, re-check the header, then apply `validator`.
    pub fn verify_compact(&self, compact: &str, validator: &JwtValidator) -> Result<VerifiedJwt> {
        format::verify_compact_with(self.algorithm, compact, validator, |data, sig| {
            self.verify(data, sig)
        })
    }

    fn verify(&self, data: &[u8], sig: &[u8]) -> Result<()> {
        let rejected = |_| SealError::VerificationFailure;
        match &self.key {
            JwtPublicKey::P256(k) => {
                let sig = p256::ecdsa::Signature::from_slice(sig).map_err(rejected)?;
                k.verify(data, &sig).map_err(rejected)
            }
            JwtPublicKey::P384(k) => {
                let sig = p384::ecdsa::Signature::from_slice(sig).map_err(rejected)?;
                k.verify(data, &sig).map_err(rejected)
            }
            JwtPublicKey::P521(k) => {
                let sig = p521::ecdsa::Signature::from_slice(sig).map_err(rejected)?;
                k.verify(data, &sig).map_err(rejected)
            }
            JwtPublicKey::Rsa(k) => {
                let hash = self.algorithm.hash();
                let digest = hash.digest(data);
                let verified = match self.algorithm.family() {
                    Family::RsaPkcs1 => k.verify(pkcs1v15(hash), &digest, sig),
                    _ => k.verify(pss(hash), &digest, sig),
                };
                verified.map_err(|_| SealError::VerificationFailure)
            }
        }
    }
}
