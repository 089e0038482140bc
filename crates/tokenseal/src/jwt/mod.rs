//! Compact signed tokens.
//!
//! Each engine is bound to one [`Algorithm`] at construction and only
//! accepts tokens whose header names that algorithm:
//!
//! | family | engine | algorithms |
//! |---|---|---|
//! | HMAC | [`JwtHmac`] | `HS256` `HS384` `HS512` |
//! | ECDSA | [`JwtPublicKeySign`] / [`JwtPublicKeyVerify`] | `ES256` `ES384` `ES512` |
//! | RSASSA-PKCS1-v1_5 | [`JwtPublicKeySign`] / [`JwtPublicKeyVerify`] | `RS256` `RS384` `RS512` |
//! | RSASSA-PSS | [`JwtPublicKeySign`] / [`JwtPublicKeyVerify`] | `PS256` `PS384` `PS512` |
//!
//! Verification authenticates first and only then looks at the header and
//! the claims; see [`format`].

pub mod algorithm;
pub mod claims;
pub mod format;
pub mod hmac;
pub mod keys;
pub mod signature;
pub mod validator;

pub use self::algorithm::{Algorithm, Family};
pub use self::claims::{ClaimValue, RawJwt, RawJwtBuilder};
pub use self::hmac::JwtHmac;
pub use self::keys::{
    derive_key, generate_ecdsa, generate_rsa, JwtPrivateKey, JwtPublicKey, RsaKeyFormat,
};
pub use self::signature::{JwtPublicKeySign, JwtPublicKeyVerify};
pub use self::validator::{
    Clock, FixedClock, JwtValidator, JwtValidatorBuilder, SystemClock, VerifiedJwt,
};
