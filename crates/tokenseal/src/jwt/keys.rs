//! Asymmetric key material and key-pair generation.
//!
//! Keys are a tagged variant per family; each variant holds only what its
//! family needs. Freshly generated key pairs are self-tested before they are
//! handed out.

use std::fmt;

use common::{Result, SealError};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use tracing::{info, warn};

use super::algorithm::{Algorithm, Family};
use super::claims::RawJwt;
use super::signature::{JwtPublicKeySign, JwtPublicKeyVerify};
use super::validator::JwtValidator;

/// Smallest RSA modulus accepted anywhere.
pub const MIN_RSA_MODULUS_BITS: usize = 2048;

/// Smallest RSA public exponent accepted for new keys (F4).
pub const MIN_RSA_PUBLIC_EXPONENT: u64 = 65537;

/// A signing key.
#[derive(Clone)]
pub enum JwtPrivateKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
    Rsa(RsaPrivateKey),
}

/// A verification key.
#[derive(Clone)]
pub enum JwtPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
    Rsa(RsaPublicKey),
}

impl JwtPrivateKey {
    /// Load an ECDSA private scalar (big-endian, field-size bytes) for the
    /// curve `algorithm` selects.
    pub fn from_ec_scalar(algorithm: Algorithm, scalar: &[u8]) -> Result<Self> {
        let bad = |_| SealError::key("invalid ECDSA private scalar");
        match algorithm {
            Algorithm::Es256 => p256::ecdsa::SigningKey::from_slice(scalar)
                .map(JwtPrivateKey::P256)
                .map_err(bad),
            Algorithm::Es384 => p384::ecdsa::SigningKey::from_slice(scalar)
                .map(JwtPrivateKey::P384)
                .map_err(bad),
            Algorithm::Es512 => p521::ecdsa::SigningKey::from_slice(scalar)
                .map(JwtPrivateKey::P521)
                .map_err(bad),
            other => Err(SealError::key(format!("{other} is not an ECDSA algorithm"))),
        }
    }

    /// Assemble an RSA private key from its modulus, exponents and primes.
    pub fn from_rsa_components(
        n: &[u8],
        e: &[u8],
        d: &[u8],
        p: &[u8],
        q: &[u8],
    ) -> Result<Self> {
        let key = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            BigUint::from_bytes_be(d),
            vec![BigUint::from_bytes_be(p), BigUint::from_bytes_be(q)],
        )
        .map_err(|e| SealError::key(format!("invalid RSA private key: {e}")))?;
        key.validate()
            .map_err(|e| SealError::key(format!("invalid RSA private key: {e}")))?;
        Ok(JwtPrivateKey::Rsa(key))
    }

    /// Derive the matching public key. Pure and deterministic.
    pub fn public_key(&self) -> JwtPublicKey {
        match self {
            JwtPrivateKey::P256(k) => JwtPublicKey::P256(p256::ecdsa::VerifyingKey::from(k)),
            JwtPrivateKey::P384(k) => JwtPublicKey::P384(p384::ecdsa::VerifyingKey::from(k)),
            JwtPrivateKey::P521(k) => JwtPublicKey::P521(p521::ecdsa::VerifyingKey::from(k)),
            JwtPrivateKey::Rsa(k) => JwtPublicKey::Rsa(k.to_public_key()),
        }
    }
}

impl fmt::Debug for JwtPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            JwtPrivateKey::P256(_) => "P256",
            JwtPrivateKey::P384(_) => "P384",
            JwtPrivateKey::P521(_) => "P521",
            JwtPrivateKey::Rsa(_) => "Rsa",
        };
        f.debug_tuple("JwtPrivateKey").field(&kind).finish()
    }
}

impl JwtPublicKey {
    /// Load an uncompressed or compressed SEC1 point for the curve
    /// `algorithm` selects.
    pub fn from_sec1(algorithm: Algorithm, point: &[u8]) -> Result<Self> {
        let bad = |_| SealError::key("invalid ECDSA public point");
        match algorithm {
            Algorithm::Es256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(JwtPublicKey::P256)
                .map_err(bad),
            Algorithm::Es384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(JwtPublicKey::P384)
                .map_err(bad),
            Algorithm::Es512 => p521::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(JwtPublicKey::P521)
                .map_err(bad),
            other => Err(SealError::key(format!("{other} is not an ECDSA algorithm"))),
        }
    }

    /// Uncompressed SEC1 encoding of an ECDSA point; `None` for RSA keys.
    pub fn sec1_point(&self) -> Option<Vec<u8>> {
        match self {
            JwtPublicKey::P256(k) => Some(k.to_encoded_point(false).as_bytes().to_vec()),
            JwtPublicKey::P384(k) => Some(k.to_encoded_point(false).as_bytes().to_vec()),
            JwtPublicKey::P521(k) => Some(k.to_encoded_point(false).as_bytes().to_vec()),
            JwtPublicKey::Rsa(_) => None,
        }
    }

    /// Assemble an RSA public key from a big-endian modulus and exponent.
    pub fn from_rsa_components(n: &[u8], e: &[u8]) -> Result<Self> {
        RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
            .map(JwtPublicKey::Rsa)
            .map_err(|e| SealError::key(format!("invalid RSA public key: {e}")))
    }

    /// Check that this key can carry `algorithm`.
    pub(crate) fn check_algorithm(&self, algorithm: Algorithm) -> Result<()> {
        let ok = match (self, algorithm.family()) {
            (JwtPublicKey::P256(_), _) => algorithm == Algorithm::Es256,
            (JwtPublicKey::P384(_), _) => algorithm == Algorithm::Es384,
            (JwtPublicKey::P521(_), _) => algorithm == Algorithm::Es512,
            (JwtPublicKey::Rsa(k), Family::RsaPkcs1 | Family::RsaPss) => {
                if k.n().bits() < MIN_RSA_MODULUS_BITS {
                    return Err(SealError::key(format!(
                        "RSA modulus of {} bits is below {MIN_RSA_MODULUS_BITS}",
                        k.n().bits()
                    )));
                }
                true
            }
            (JwtPublicKey::Rsa(_), _) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(SealError::key(format!(
                "key type does not support {algorithm}"
            )))
        }
    }
}

impl fmt::Debug for JwtPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            JwtPublicKey::P256(_) => "P256",
            JwtPublicKey::P384(_) => "P384",
            JwtPublicKey::P521(_) => "P521",
            JwtPublicKey::Rsa(_) => "Rsa",
        };
        f.debug_tuple("JwtPublicKey").field(&kind).finish()
    }
}

/// Parameters for a new RSA key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaKeyFormat {
    pub algorithm: Algorithm,
    pub modulus_bits: usize,
    pub public_exponent: u64,
}

impl RsaKeyFormat {
    /// An arbitrary format; check it with [`RsaKeyFormat::validate`].
    pub const fn new(algorithm: Algorithm, modulus_bits: usize, public_exponent: u64) -> Self {
        Self {
            algorithm,
            modulus_bits,
            public_exponent,
        }
    }

    pub const fn rs256_2048() -> Self {
        Self::new(Algorithm::Rs256, 2048, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn rs256_3072() -> Self {
        Self::new(Algorithm::Rs256, 3072, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn rs384_3072() -> Self {
        Self::new(Algorithm::Rs384, 3072, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn rs512_4096() -> Self {
        Self::new(Algorithm::Rs512, 4096, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn ps256_2048() -> Self {
        Self::new(Algorithm::Ps256, 2048, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn ps256_3072() -> Self {
        Self::new(Algorithm::Ps256, 3072, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn ps384_3072() -> Self {
        Self::new(Algorithm::Ps384, 3072, MIN_RSA_PUBLIC_EXPONENT)
    }

    pub const fn ps512_4096() -> Self {
        Self::new(Algorithm::Ps512, 4096, MIN_RSA_PUBLIC_EXPONENT)
    }

    /// Reject formats below policy before any key material is generated.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::KeyConstruction`] if the algorithm is not `RS*` or
    /// `PS*`, the modulus is under [`MIN_RSA_MODULUS_BITS`], or the exponent
    /// is even or under [`MIN_RSA_PUBLIC_EXPONENT`].
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.algorithm.family(), Family::RsaPkcs1 | Family::RsaPss) {
            return Err(SealError::key(format!(
                "{} is not an RSA algorithm",
                self.algorithm
            )));
        }
        if self.modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(SealError::key(format!(
                "RSA modulus of {} bits is below {MIN_RSA_MODULUS_BITS}",
                self.modulus_bits
            )));
        }
        if self.public_exponent < MIN_RSA_PUBLIC_EXPONENT || self.public_exponent % 2 == 0 {
            return Err(SealError::key(format!(
                "RSA public exponent {} must be odd and at least {MIN_RSA_PUBLIC_EXPONENT}",
                self.public_exponent
            )));
        }
        Ok(())
    }
}

/// Generate a fresh ECDSA key pair for `ES256`, `ES384` or `ES512`.
pub fn generate_ecdsa(algorithm: Algorithm) -> Result<JwtPublicKeySign> {
    let key = match algorithm {
        Algorithm::Es256 => JwtPrivateKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
        Algorithm::Es384 => JwtPrivateKey::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
        Algorithm::Es512 => JwtPrivateKey::P521(p521::ecdsa::SigningKey::random(&mut OsRng)),
        other => {
            return Err(SealError::key(format!(
                "{other} is not an ECDSA algorithm"
            )))
        }
    };
    info!(alg = %algorithm, "generated ECDSA key pair");
    self_tested(JwtPublicKeySign::new(algorithm, key)?)
}

/// Generate a fresh RSA key pair for `format`.
pub fn generate_rsa(format: &RsaKeyFormat) -> Result<JwtPublicKeySign> {
    format.validate()?;
    let exponent = BigUint::from(format.public_exponent);
    let key = RsaPrivateKey::new_with_exp(&mut OsRng, format.modulus_bits, &exponent)
        .map_err(|e| SealError::key(format!("RSA key generation failed: {e}")))?;
    info!(
        alg = %format.algorithm,
        modulus_bits = format.modulus_bits,
        "generated RSA key pair"
    );
    self_tested(JwtPublicKeySign::new(format.algorithm, JwtPrivateKey::Rsa(key))?)
}

/// Deterministic derivation from a seed stream is not offered for signing
/// keys; this always fails.
pub fn derive_key(algorithm: Algorithm, _seed: &mut dyn std::io::Read) -> Result<JwtPublicKeySign> {
    Err(SealError::key(format!(
        "deriving {algorithm} keys from a seed is not supported"
    )))
}

/// Self-test against the public key derived from `signer`.
fn self_tested(signer: JwtPublicKeySign) -> Result<JwtPublicKeySign> {
    let verifier = signer.public_key_verify()?;
    checked_pair(signer, &verifier)
}

/// Sign an empty claim set with `signer` and verify it with `verifier`. The
/// signer is only handed back if verification succeeds.
fn checked_pair(
    signer: JwtPublicKeySign,
    verifier: &JwtPublicKeyVerify,
) -> Result<JwtPublicKeySign> {
    let outcome = signer
        .create_compact(&RawJwt::empty())
        .and_then(|compact| verifier.verify_compact(&compact, &JwtValidator::default()));
    match outcome {
        Ok(_) => Ok(signer),
        Err(e) => {
            warn!(alg = %signer.algorithm(), error = %e, "key self-test failed");
            Err(SealError::key(format!("key self-test failed: {e}")))
        }
    }
}
