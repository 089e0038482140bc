//! Wire-level definitions for the compact signed-token format.
//!
//! ```text
//! base64url(header-json) "." base64url(payload-json) "." base64url(signature)
//! ```
//!
//! No `=` padding; `.` is the only separator and appears exactly twice.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The only `typ` value accepted in a token header.
pub const TYPE_JWT: &str = "JWT";

/// Number of `.`-separated segments in a compact token.
pub const COMPACT_SEGMENTS: usize = 3;

/// JOSE header of a compact token.
///
/// Serialises as `{"alg":"<id>","typ":"JWT"}`. Unknown header fields are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Algorithm identifier, e.g. `"HS256"`.
    pub alg: String,
    /// Media type; optional on the wire but must be `"JWT"` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl JwtHeader {
    /// Construct the header emitted for a freshly signed token.
    pub fn new(alg: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            typ: Some(TYPE_JWT.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Reserved claims
// ---------------------------------------------------------------------------

/// `iss`
pub const CLAIM_ISSUER: &str = "iss";
/// `sub`
pub const CLAIM_SUBJECT: &str = "sub";
/// `aud`
pub const CLAIM_AUDIENCE: &str = "aud";
/// `jti`
pub const CLAIM_JWT_ID: &str = "jti";
/// `exp`
pub const CLAIM_EXPIRATION: &str = "exp";
/// `nbf`
pub const CLAIM_NOT_BEFORE: &str = "nbf";
/// `iat`
pub const CLAIM_ISSUED_AT: &str = "iat";

/// Claims that may only be set through typed accessors.
pub const RESERVED_CLAIMS: [&str; 7] = [
    CLAIM_ISSUER,
    CLAIM_SUBJECT,
    CLAIM_AUDIENCE,
    CLAIM_JWT_ID,
    CLAIM_EXPIRATION,
    CLAIM_NOT_BEFORE,
    CLAIM_ISSUED_AT,
];

/// Returns `true` if `name` is one of [`RESERVED_CLAIMS`].
pub fn is_reserved_claim(name: &str) -> bool {
    RESERVED_CLAIMS.contains(&name)
}
