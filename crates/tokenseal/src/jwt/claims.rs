//! Claim sets: the typed payload model behind every token.
//!
//! A [`RawJwt`] is immutable once built. Reserved claims (`iss`, `sub`,
//! `aud`, `jti`, `exp`, `nbf`, `iat`) are only reachable through typed
//! accessors; everything else is a custom claim holding a [`ClaimValue`].

use chrono::{DateTime, Utc};
use common::protocol::{
    is_reserved_claim, CLAIM_AUDIENCE, CLAIM_EXPIRATION, CLAIM_ISSUED_AT, CLAIM_ISSUER,
    CLAIM_JWT_ID, CLAIM_NOT_BEFORE, CLAIM_SUBJECT,
};
use std::fmt;

use common::{Result, SealError};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Number, Value};

const TIMESTAMP_CLAIMS: [&str; 3] = [CLAIM_EXPIRATION, CLAIM_NOT_BEFORE, CLAIM_ISSUED_AT];
const STRING_CLAIMS: [&str; 3] = [CLAIM_ISSUER, CLAIM_SUBJECT, CLAIM_JWT_ID];

/// Value of a custom claim.
///
/// JSON cannot tell a 32-bit integer from a 64-bit one, so both are
/// [`ClaimValue::Integer`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    StringArray(Vec<String>),
}

impl ClaimValue {
    fn to_json(&self) -> Option<Value> {
        Some(match self {
            ClaimValue::Null => Value::Null,
            ClaimValue::Bool(b) => Value::Bool(*b),
            ClaimValue::Integer(i) => Value::from(*i),
            ClaimValue::Double(d) => Value::Number(Number::from_f64(*d)?),
            ClaimValue::String(s) => Value::String(s.clone()),
            ClaimValue::StringArray(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        })
    }

    /// `None` for objects, mixed arrays and integers beyond `i64`.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(ClaimValue::Null),
            Value::Bool(b) => Some(ClaimValue::Bool(*b)),
            Value::Number(n) if n.is_f64() => n.as_f64().map(ClaimValue::Double),
            Value::Number(n) => n.as_i64().map(ClaimValue::Integer),
            Value::String(s) => Some(ClaimValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(ClaimValue::StringArray),
            Value::Object(_) => None,
        }
    }
}

impl From<bool> for ClaimValue {
    fn from(v: bool) -> Self {
        ClaimValue::Bool(v)
    }
}

impl From<i32> for ClaimValue {
    fn from(v: i32) -> Self {
        ClaimValue::Integer(v.into())
    }
}

impl From<i64> for ClaimValue {
    fn from(v: i64) -> Self {
        ClaimValue::Integer(v)
    }
}

impl From<f64> for ClaimValue {
    fn from(v: f64) -> Self {
        ClaimValue::Double(v)
    }
}

impl From<&str> for ClaimValue {
    fn from(v: &str) -> Self {
        ClaimValue::String(v.to_owned())
    }
}

impl From<String> for ClaimValue {
    fn from(v: String) -> Self {
        ClaimValue::String(v)
    }
}

impl From<Vec<String>> for ClaimValue {
    fn from(v: Vec<String>) -> Self {
        ClaimValue::StringArray(v)
    }
}

impl From<Vec<&str>> for ClaimValue {
    fn from(v: Vec<&str>) -> Self {
        ClaimValue::StringArray(v.into_iter().map(str::to_owned).collect())
    }
}

/// An unverified claim set, ready to be signed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawJwt {
    claims: Map<String, Value>,
}

impl RawJwt {
    /// Start an empty claim set.
    pub fn builder() -> RawJwtBuilder {
        RawJwtBuilder::default()
    }

    /// A claim set with no claims at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.string_claim(CLAIM_ISSUER)
    }

    pub fn subject(&self) -> Option<&str> {
        self.string_claim(CLAIM_SUBJECT)
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.string_claim(CLAIM_JWT_ID)
    }

    /// Audiences, always as a list even if the token carried a single string.
    pub fn audiences(&self) -> Option<Vec<&str>> {
        self.claims
            .get(CLAIM_AUDIENCE)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim(CLAIM_EXPIRATION)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim(CLAIM_NOT_BEFORE)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim(CLAIM_ISSUED_AT)
    }

    /// Look up a custom claim. Reserved names always return `None`; use the
    /// typed accessors for those.
    pub fn claim(&self, name: &str) -> Option<ClaimValue> {
        if is_reserved_claim(name) {
            return None;
        }
        self.claims.get(name).and_then(ClaimValue::from_json)
    }

    /// Whether `name` is present, reserved or not.
    pub fn has_claim(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// Names of all custom (non-reserved) claims, sorted.
    pub fn custom_claim_names(&self) -> Vec<&str> {
        self.claims
            .keys()
            .map(String::as_str)
            .filter(|name| !is_reserved_claim(name))
            .collect()
    }

    /// Serialise the claims as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.claims).map_err(|_| SealError::Format("unencodable claims"))
    }

    /// Parse and normalise a JSON claims object.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Format`] if the input is not a JSON object, a
    /// claim name appears twice, a reserved claim has the wrong type, or a
    /// custom claim's value is outside [`ClaimValue`].
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let UniqueClaims(claims) =
            serde_json::from_slice(json).map_err(|_| SealError::Format("invalid payload json"))?;
        Self::from_claims(claims)
    }

    fn from_claims(mut claims: Map<String, Value>) -> Result<Self> {
        for name in STRING_CLAIMS {
            if matches!(claims.get(name), Some(v) if !v.is_string()) {
                return Err(SealError::Format("string claim has wrong type"));
            }
        }

        if let Some(Value::String(single)) = claims.get(CLAIM_AUDIENCE) {
            let single = Value::String(single.clone());
            claims.insert(CLAIM_AUDIENCE.to_owned(), Value::Array(vec![single]));
        }
        match claims.get(CLAIM_AUDIENCE) {
            None => {}
            Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_string) => {}
            Some(_) => return Err(SealError::Format("invalid audience claim")),
        }

        for name in TIMESTAMP_CLAIMS {
            if let Some(v) = claims.get_mut(name) {
                let secs = match v.as_i64() {
                    Some(secs) => secs,
                    None => v
                        .as_f64()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                        .ok_or(SealError::Format("timestamp claim has wrong type"))?,
                };
                if DateTime::from_timestamp(secs, 0).is_none() {
                    return Err(SealError::Format("timestamp claim out of range"));
                }
                *v = Value::from(secs);
            }
        }

        for (name, value) in &claims {
            if !is_reserved_claim(name) && ClaimValue::from_json(value).is_none() {
                return Err(SealError::Format("unsupported custom claim value"));
            }
        }

        Ok(Self { claims })
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name)?.as_str()
    }

    fn timestamp_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.get(name)?.as_i64()?, 0)
    }
}

/// A top-level JSON object that refuses repeated member names.
struct UniqueClaims(Map<String, Value>);

impl<'de> Deserialize<'de> for UniqueClaims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ClaimsVisitor;

        impl<'de> Visitor<'de> for ClaimsVisitor {
            type Value = UniqueClaims;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object with unique member names")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<UniqueClaims, A::Error> {
                let mut claims = Map::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    if claims.contains_key(&name) {
                        return Err(de::Error::custom(format_args!("duplicate claim {name}")));
                    }
                    claims.insert(name, value);
                }
                Ok(UniqueClaims(claims))
            }
        }

        deserializer.deserialize_map(ClaimsVisitor)
    }
}

/// Builder for [`RawJwt`].
///
/// Setters never fail; the first invalid input is remembered and reported by
/// [`RawJwtBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct RawJwtBuilder {
    claims: Map<String, Value>,
    error: Option<String>,
}

impl RawJwtBuilder {
    pub fn issuer(self, issuer: impl Into<String>) -> Self {
        self.set(CLAIM_ISSUER, Value::String(issuer.into()))
    }

    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.set(CLAIM_SUBJECT, Value::String(subject.into()))
    }

    pub fn jwt_id(self, id: impl Into<String>) -> Self {
        self.set(CLAIM_JWT_ID, Value::String(id.into()))
    }

    /// Append one audience. `aud` is always encoded as an array.
    pub fn add_audience(mut self, audience: impl Into<String>) -> Self {
        let entry = self
            .claims
            .entry(CLAIM_AUDIENCE)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(Value::String(audience.into()));
        }
        self
    }

    /// Set `exp`, truncated to whole seconds.
    pub fn expiration(self, at: DateTime<Utc>) -> Self {
        self.set(CLAIM_EXPIRATION, Value::from(at.timestamp()))
    }

    /// Set `nbf`, truncated to whole seconds.
    pub fn not_before(self, at: DateTime<Utc>) -> Self {
        self.set(CLAIM_NOT_BEFORE, Value::from(at.timestamp()))
    }

    /// Set `iat`, truncated to whole seconds.
    pub fn issued_at(self, at: DateTime<Utc>) -> Self {
        self.set(CLAIM_ISSUED_AT, Value::from(at.timestamp()))
    }

    /// Set a custom claim. Reserved names are refused at build time.
    pub fn add_claim(self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        let name = name.into();
        if is_reserved_claim(&name) {
            return self.fail(format!("claim {name} is reserved; use the typed setter"));
        }
        match value.into().to_json() {
            Some(json) => self.set(name, json),
            None => self.fail(format!("claim {name} is not a finite number")),
        }
    }

    /// Finish the claim set.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Configuration`] if any setter was given a reserved
    /// claim name or a non-finite number.
    pub fn build(self) -> Result<RawJwt> {
        match self.error {
            Some(msg) => Err(SealError::config(msg)),
            None => Ok(RawJwt {
                claims: self.claims,
            }),
        }
    }

    fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    fn fail(mut self, msg: String) -> Self {
        self.error.get_or_insert(msg);
        self
    }
}
