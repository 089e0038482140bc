//! Compact serialisation: `header.payload.signature`, each base64url without
//! padding.
//!
//! Every verifying engine funnels through [`verify_compact_with`] so the
//! check order is the same everywhere:
//!
//! 1. split into exactly three segments and base64url-decode each
//! 2. authenticate `header.payload` with the engine's key
//! 3. re-check the header `alg`/`typ`
//! 4. decode and normalise the payload
//! 5. apply the [`JwtValidator`]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::protocol::{JwtHeader, COMPACT_SEGMENTS, TYPE_JWT};
use common::{Result, SealError};
use tracing::debug;

use super::algorithm::Algorithm;
use super::claims::RawJwt;
use super::validator::{JwtValidator, VerifiedJwt};

/// base64url of `{"alg":"<alg>","typ":"JWT"}`.
pub fn encode_header(algorithm: Algorithm) -> Result<String> {
    let json = serde_json::to_vec(&JwtHeader::new(algorithm.as_str()))
        .map_err(|_| SealError::Format("unencodable header"))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// base64url of the claims JSON.
pub fn encode_payload(raw: &RawJwt) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(raw.to_json()?))
}

/// `header.payload`, the byte string that gets signed.
pub fn create_unsigned_compact(algorithm: Algorithm, raw: &RawJwt) -> Result<String> {
    Ok(format!(
        "{}.{}",
        encode_header(algorithm)?,
        encode_payload(raw)?
    ))
}

/// Append the encoded signature to an unsigned compact.
pub fn create_signed_compact(unsigned: &str, signature: &[u8]) -> String {
    format!("{unsigned}.{}", URL_SAFE_NO_PAD.encode(signature))
}

/// A compact token split and decoded, nothing validated yet.
#[derive(Debug)]
pub struct ParsedCompact<'a> {
    /// `header.payload` exactly as received; this is what was signed.
    pub unsigned: &'a str,
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Split a compact token and decode its three segments.
///
/// # Errors
///
/// Returns [`SealError::Format`] for any segment count other than three or
/// any segment that is not base64url without padding.
pub fn parse(compact: &str) -> Result<ParsedCompact<'_>> {
    let segments: Vec<&str> = compact.split('.').collect();
    if segments.len() != COMPACT_SEGMENTS {
        return Err(SealError::Format("invalid compact token"));
    }
    let decode = |s: &str| {
        URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| SealError::Format("invalid compact token"))
    };
    let header = decode(segments[0])?;
    let payload = decode(segments[1])?;
    let signature = decode(segments[2])?;
    let unsigned = &compact[..segments[0].len() + 1 + segments[1].len()];
    Ok(ParsedCompact {
        unsigned,
        header,
        payload,
        signature,
    })
}

/// Check the decoded header against the engine's algorithm.
///
/// # Errors
///
/// [`SealError::Format`] if the header is not JSON with a string `alg`;
/// [`SealError::AlgorithmMismatch`] if `alg` differs from `expected` or `typ`
/// is present and not `"JWT"`.
pub fn validate_header(expected: Algorithm, header: &[u8]) -> Result<()> {
    let header: JwtHeader =
        serde_json::from_slice(header).map_err(|_| SealError::Format("invalid header json"))?;
    if header.alg != expected.as_str() {
        return Err(SealError::AlgorithmMismatch(format!(
            "token alg {} does not match {expected}",
            header.alg
        )));
    }
    match header.typ.as_deref() {
        None | Some(TYPE_JWT) => Ok(()),
        Some(other) => Err(SealError::AlgorithmMismatch(format!(
            "unsupported typ {other}"
        ))),
    }
}

/// Decode the payload segment into a claim set.
pub fn decode_payload(payload: &[u8]) -> Result<RawJwt> {
    RawJwt::from_json(payload)
}

/// Shared verification flow. `authenticate` receives the unsigned bytes and
/// the decoded signature; any error it returns becomes
/// [`SealError::VerificationFailure`].
pub(crate) fn verify_compact_with<F>(
    algorithm: Algorithm,
    compact: &str,
    validator: &JwtValidator,
    authenticate: F,
) -> Result<VerifiedJwt>
where
    F: FnOnce(&[u8], &[u8]) -> Result<()>,
{
    let parsed = parse(compact)?;
    if authenticate(parsed.unsigned.as_bytes(), &parsed.signature).is_err() {
        debug!(alg = %algorithm, "token signature rejected");
        return Err(SealError::VerificationFailure);
    }
    validate_header(algorithm, &parsed.header)?;
    let raw = decode_payload(&parsed.payload)?;
    validator.validate(raw)
}
