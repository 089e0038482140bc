//! Configuration loading and validation for `sealtool`.
//!
//! All values come from `SEALTOOL_`-prefixed environment variables, e.g.
//! `SEALTOOL_AEAD_ENC_KEY`. Keys are hex. A key is only required by the
//! subcommands that use it, but any key that is set must decode.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokenseal::crypto::HashType;
use tokenseal::jwt::{Algorithm, FixedClock, JwtValidator};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SEALTOOL";

/// Validated tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// AES key for `aead` (16 or 32 bytes, hex).
    pub aead_enc_key: Option<String>,

    /// HMAC key for `aead` (at least 16 bytes, hex).
    pub aead_mac_key: Option<String>,

    /// IV length for `aead`.
    #[serde(default = "default_aead_iv_len")]
    pub aead_iv_len: usize,

    /// Tag length for `aead`.
    #[serde(default = "default_aead_tag_len")]
    pub aead_tag_len: usize,

    /// HMAC hash for `aead`.
    #[serde(default = "default_hash")]
    pub aead_hash: String,

    /// HMAC key for `mac` (hex).
    pub mac_key: Option<String>,

    /// HMAC hash for `mac`.
    #[serde(default = "default_hash")]
    pub mac_hash: String,

    /// Tag length for `mac`; the full digest when unset.
    pub mac_tag_len: Option<usize>,

    /// Token algorithm, e.g. `"HS256"` or `"ES384"`.
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,

    /// HMAC key or ECDSA private scalar for `jwt` (hex).
    pub jwt_key: Option<String>,

    /// Audience the verifier expects.
    pub jwt_audience: Option<String>,

    /// Clock skew tolerated by the verifier.
    #[serde(default)]
    pub jwt_clock_skew_secs: u64,

    /// Verify as if the current time were this Unix timestamp.
    pub jwt_now: Option<i64>,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_aead_iv_len() -> usize {
    16
}
fn default_aead_tag_len() -> usize {
    16
}
fn default_hash() -> String {
    "SHA256".into()
}
fn default_jwt_algorithm() -> String {
    "HS256".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.aead_hash()?;
        self.mac_hash()?;
        self.jwt_algorithm()?;
        for (name, value) in [
            ("AEAD_ENC_KEY", &self.aead_enc_key),
            ("AEAD_MAC_KEY", &self.aead_mac_key),
            ("MAC_KEY", &self.mac_key),
            ("JWT_KEY", &self.jwt_key),
        ] {
            if let Some(hex_key) = value {
                hex::decode(hex_key.trim())
                    .with_context(|| format!("{ENV_PREFIX}_{name} is not valid hex"))?;
            }
        }
        if !(12..=16).contains(&self.aead_iv_len) {
            anyhow::bail!("{ENV_PREFIX}_AEAD_IV_LEN must be between 12 and 16");
        }
        if self.jwt_clock_skew_secs > 600 {
            anyhow::bail!("{ENV_PREFIX}_JWT_CLOCK_SKEW_SECS must be at most 600");
        }
        if let Some(now) = self.jwt_now {
            if DateTime::<Utc>::from_timestamp(now, 0).is_none() {
                anyhow::bail!("{ENV_PREFIX}_JWT_NOW is not a representable timestamp");
            }
        }
        Ok(())
    }

    pub fn aead_hash(&self) -> Result<HashType> {
        self.aead_hash
            .parse()
            .with_context(|| format!("{ENV_PREFIX}_AEAD_HASH is invalid"))
    }

    pub fn mac_hash(&self) -> Result<HashType> {
        self.mac_hash
            .parse()
            .with_context(|| format!("{ENV_PREFIX}_MAC_HASH is invalid"))
    }

    pub fn jwt_algorithm(&self) -> Result<Algorithm> {
        self.jwt_algorithm
            .parse()
            .with_context(|| format!("{ENV_PREFIX}_JWT_ALGORITHM is invalid"))
    }

    /// Decode a required hex key, naming the variable if it is missing.
    pub fn key(value: &Option<String>, name: &str) -> Result<Vec<u8>> {
        let hex_key = value
            .as_deref()
            .with_context(|| format!("{ENV_PREFIX}_{name} is required"))?;
        hex::decode(hex_key.trim()).with_context(|| format!("{ENV_PREFIX}_{name} is not valid hex"))
    }

    /// Validator for `jwt verify`.
    pub fn jwt_validator(&self) -> Result<JwtValidator> {
        let mut builder =
            JwtValidator::builder().clock_skew(Duration::from_secs(self.jwt_clock_skew_secs));
        if let Some(aud) = &self.jwt_audience {
            builder = builder.expected_audience(aud.clone());
        }
        if let Some(now) = self.jwt_now.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)) {
            builder = builder.clock(FixedClock::new(now));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Config {
    Config {
        log_level: default_log_level(),
        aead_enc_key: Some("101112131415161718191a1b1c1d1e1f".into()),
        aead_mac_key: Some("000102030405060708090a0b0c0d0e0f".into()),
        aead_iv_len: default_aead_iv_len(),
        aead_tag_len: default_aead_tag_len(),
        aead_hash: default_hash(),
        mac_key: Some("00112233445566778899aabbccddeeff".into()),
        mac_hash: default_hash(),
        mac_tag_len: None,
        jwt_algorithm: default_jwt_algorithm(),
        jwt_key: Some("5a".repeat(32)),
        jwt_audience: None,
        jwt_clock_skew_secs: 0,
        jwt_now: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_log_level(), "warn");
        assert_eq!(default_aead_iv_len(), 16);
        assert_eq!(default_aead_tag_len(), 16);
        assert_eq!(default_hash(), "SHA256");
        assert_eq!(default_jwt_algorithm(), "HS256");
    }

    #[test]
    fn sample_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_hex() {
        let cfg = Config {
            mac_key: Some("zz".into()),
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_algorithm() {
        let cfg = Config {
            jwt_algorithm: "none".into(),
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_hash() {
        let cfg = Config {
            aead_hash: "MD5".into(),
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_iv_length() {
        let cfg = Config {
            aead_iv_len: 8,
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_skew() {
        let cfg = Config {
            jwt_clock_skew_secs: 601,
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_key_is_named() {
        let err = Config::key(&None, "JWT_KEY").unwrap_err();
        assert!(err.to_string().contains("SEALTOOL_JWT_KEY"));
    }

    #[test]
    fn fixed_clock_validator() {
        let cfg = Config {
            jwt_now: Some(1_300_819_320),
            jwt_audience: Some("bar".into()),
            ..sample()
        };
        let v = cfg.jwt_validator().unwrap();
        assert_eq!(v.expected_audience(), Some("bar"));
    }
}
