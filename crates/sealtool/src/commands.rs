//! Subcommands. Every command reads its inputs from files and writes its
//! result to a file, so another implementation can be driven the same way.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tokenseal::crypto::{Aead, EncryptThenAuthenticate, HmacEngine, MacEngine};
use tokenseal::jwt::{
    Algorithm, Family, JwtHmac, JwtPrivateKey, JwtPublicKeySign, RawJwt, VerifiedJwt,
};
use tracing::info;

use crate::config::Config;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// AES-CTR-HMAC authenticated encryption.
    Aead {
        #[command(subcommand)]
        op: AeadOp,
    },
    /// HMAC tags.
    Mac {
        #[command(subcommand)]
        op: MacOp,
    },
    /// Compact signed tokens.
    Jwt {
        #[command(subcommand)]
        op: JwtOp,
    },
}

#[derive(Debug, Subcommand)]
pub enum AeadOp {
    /// Encrypt `input` bound to the contents of `aad`.
    Encrypt {
        input: PathBuf,
        aad: PathBuf,
        output: PathBuf,
    },
    /// Decrypt `input` bound to the contents of `aad`.
    Decrypt {
        input: PathBuf,
        aad: PathBuf,
        output: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum MacOp {
    /// Write the tag of `input` to `output`.
    Compute { input: PathBuf, output: PathBuf },
    /// Check that `tag` is the tag of `input`.
    Verify { input: PathBuf, tag: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum JwtOp {
    /// Sign the JSON claims in `claims` and write the compact token.
    Sign { claims: PathBuf, output: PathBuf },
    /// Verify the compact token in `token` and write its claims as JSON.
    Verify { token: PathBuf, output: PathBuf },
}

/// Execute `command` with keys and options from `cfg`.
pub fn run(command: &Command, cfg: &Config) -> Result<()> {
    match command {
        Command::Aead { op } => run_aead(op, cfg),
        Command::Mac { op } => run_mac(op, cfg),
        Command::Jwt { op } => run_jwt(op, cfg),
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

// ---------------------------------------------------------------------------
// aead
// ---------------------------------------------------------------------------

fn aead(cfg: &Config) -> Result<EncryptThenAuthenticate> {
    let enc_key = Config::key(&cfg.aead_enc_key, "AEAD_ENC_KEY")?;
    let mac_key = Config::key(&cfg.aead_mac_key, "AEAD_MAC_KEY")?;
    Ok(EncryptThenAuthenticate::aes_ctr_hmac(
        &enc_key,
        cfg.aead_iv_len,
        &mac_key,
        cfg.aead_hash()?,
        cfg.aead_tag_len,
    )?)
}

fn run_aead(op: &AeadOp, cfg: &Config) -> Result<()> {
    let aead = aead(cfg)?;
    match op {
        AeadOp::Encrypt { input, aad, output } => {
            let ct = aead.encrypt(&read(input)?, &read(aad)?)?;
            write(output, &ct)?;
            info!(bytes = ct.len(), "aead encrypt");
        }
        AeadOp::Decrypt { input, aad, output } => {
            let pt = aead.decrypt(&read(input)?, &read(aad)?)?;
            write(output, &pt)?;
            info!(bytes = pt.len(), "aead decrypt");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// mac
// ---------------------------------------------------------------------------

fn mac(cfg: &Config) -> Result<HmacEngine> {
    let key = Config::key(&cfg.mac_key, "MAC_KEY")?;
    let hash = cfg.mac_hash()?;
    let engine = match cfg.mac_tag_len {
        Some(tag_len) => HmacEngine::new(hash, &key, tag_len)?,
        None => HmacEngine::untruncated(hash, &key)?,
    };
    Ok(engine)
}

fn run_mac(op: &MacOp, cfg: &Config) -> Result<()> {
    let mac = mac(cfg)?;
    match op {
        MacOp::Compute { input, output } => {
            let tag = mac.compute_mac(&read(input)?)?;
            write(output, &tag)?;
        }
        MacOp::Verify { input, tag } => {
            mac.verify_mac(&read(tag)?, &read(input)?)?;
            info!("mac verified");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// jwt
// ---------------------------------------------------------------------------

enum TokenEngine {
    Hmac(JwtHmac),
    Signature(JwtPublicKeySign),
}

impl TokenEngine {
    fn from_config(cfg: &Config) -> Result<Self> {
        let algorithm = cfg.jwt_algorithm()?;
        let key = Config::key(&cfg.jwt_key, "JWT_KEY")?;
        match algorithm.family() {
            Family::Hmac => Ok(TokenEngine::Hmac(JwtHmac::new(algorithm, &key)?)),
            Family::Ecdsa => {
                let private = JwtPrivateKey::from_ec_scalar(algorithm, &key)?;
                Ok(TokenEngine::Signature(JwtPublicKeySign::new(
                    algorithm, private,
                )?))
            }
            Family::RsaPkcs1 | Family::RsaPss => anyhow::bail!(
                "{algorithm} keys cannot be loaded from {}_JWT_KEY",
                crate::config::ENV_PREFIX
            ),
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            TokenEngine::Hmac(e) => e.algorithm(),
            TokenEngine::Signature(e) => e.algorithm(),
        }
    }

    fn sign(&self, raw: &RawJwt) -> Result<String> {
        Ok(match self {
            TokenEngine::Hmac(e) => e.create_compact(raw)?,
            TokenEngine::Signature(e) => e.create_compact(raw)?,
        })
    }

    fn verify(&self, compact: &str, cfg: &Config) -> Result<VerifiedJwt> {
        let validator = cfg.jwt_validator()?;
        Ok(match self {
            TokenEngine::Hmac(e) => e.verify_compact(compact, &validator)?,
            TokenEngine::Signature(e) => e.public_key_verify()?.verify_compact(compact, &validator)?,
        })
    }
}

fn run_jwt(op: &JwtOp, cfg: &Config) -> Result<()> {
    let engine = TokenEngine::from_config(cfg)?;
    match op {
        JwtOp::Sign { claims, output } => {
            let raw = RawJwt::from_json(&read(claims)?)?;
            let compact = engine.sign(&raw)?;
            write(output, compact.as_bytes())?;
            info!(alg = %engine.algorithm(), "jwt signed");
        }
        JwtOp::Verify { token, output } => {
            let compact = String::from_utf8(read(token)?)
                .map_err(|_| tokenseal::SealError::Format("token is not UTF-8"))?;
            let verified = engine.verify(compact.trim(), cfg)?;
            write(output, verified.to_json()?.as_bytes())?;
            info!(alg = %engine.algorithm(), "jwt verified");
        }
    }
    Ok(())
}
