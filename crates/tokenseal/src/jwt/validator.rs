//! Claim acceptance policy, applied only after a token has authenticated.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::{ClaimViolation, Result, SealError};
use tracing::debug;

use super::claims::{ClaimValue, RawJwt};

/// Largest clock skew a validator will accept.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(10 * 60);

/// Source of "now" for time-based claim checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Time and audience policy for verified tokens.
///
/// Audience binding is symmetric: a token with audiences needs a validator
/// expecting one of them, and a validator expecting an audience needs a token
/// that names it.
#[derive(Clone)]
pub struct JwtValidator {
    expected_audience: Option<String>,
    clock: Arc<dyn Clock>,
    clock_skew: TimeDelta,
}

impl JwtValidator {
    /// Start from the defaults: system clock, no skew, no audience.
    pub fn builder() -> JwtValidatorBuilder {
        JwtValidatorBuilder::default()
    }

    /// Audience a token must name, if any.
    pub fn expected_audience(&self) -> Option<&str> {
        self.expected_audience.as_deref()
    }

    pub(crate) fn validate(&self, raw: RawJwt) -> Result<VerifiedJwt> {
        if let Err(violation) = self.check(&raw) {
            debug!(%violation, "token claims rejected");
            return Err(SealError::ClaimValidation(violation));
        }
        Ok(VerifiedJwt { raw })
    }

    fn check(&self, raw: &RawJwt) -> std::result::Result<(), ClaimViolation> {
        let now = self.clock.now();
        if let Some(exp) = raw.expiration() {
            if now - self.clock_skew >= exp {
                return Err(ClaimViolation::Expired);
            }
        }
        if let Some(nbf) = raw.not_before() {
            if now + self.clock_skew < nbf {
                return Err(ClaimViolation::NotYetValid);
            }
        }
        match (raw.audiences(), self.expected_audience.as_deref()) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(ClaimViolation::MissingAudience),
            (Some(_), None) => Err(ClaimViolation::UnexpectedAudience),
            (Some(auds), Some(expected)) if auds.contains(&expected) => Ok(()),
            (Some(_), Some(_)) => Err(ClaimViolation::AudienceMismatch),
        }
    }
}

impl Default for JwtValidator {
    /// System clock, no skew, no expected audience.
    fn default() -> Self {
        Self {
            expected_audience: None,
            clock: Arc::new(SystemClock),
            clock_skew: TimeDelta::zero(),
        }
    }
}

impl fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtValidator")
            .field("expected_audience", &self.expected_audience)
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

/// Builder for [`JwtValidator`].
#[derive(Default)]
pub struct JwtValidatorBuilder {
    expected_audience: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    clock_skew: Duration,
}

impl JwtValidatorBuilder {
    pub fn expected_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// # Errors
    ///
    /// Returns [`SealError::Configuration`] if the skew exceeds
    /// [`MAX_CLOCK_SKEW`].
    pub fn build(self) -> Result<JwtValidator> {
        if self.clock_skew > MAX_CLOCK_SKEW {
            return Err(SealError::config(format!(
                "clock skew {:?} exceeds {:?}",
                self.clock_skew, MAX_CLOCK_SKEW
            )));
        }
        let clock_skew = TimeDelta::from_std(self.clock_skew)
            .map_err(|e| SealError::config(format!("invalid clock skew: {e}")))?;
        Ok(JwtValidator {
            expected_audience: self.expected_audience,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            clock_skew,
        })
    }
}

/// Claims of a token whose signature and claims have both been accepted.
///
/// Only produced by a verifying engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedJwt {
    raw: RawJwt,
}

impl VerifiedJwt {
    pub fn issuer(&self) -> Option<&str> {
        self.raw.issuer()
    }

    pub fn subject(&self) -> Option<&str> {
        self.raw.subject()
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.raw.jwt_id()
    }

    pub fn audiences(&self) -> Option<Vec<&str>> {
        self.raw.audiences()
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.raw.expiration()
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.raw.not_before()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.raw.issued_at()
    }

    pub fn claim(&self, name: &str) -> Option<ClaimValue> {
        self.raw.claim(name)
    }

    pub fn custom_claim_names(&self) -> Vec<&str> {
        self.raw.custom_claim_names()
    }

    pub fn to_json(&self) -> Result<String> {
        self.raw.to_json()
    }

    pub fn as_raw(&self) -> &RawJwt {
        &self.raw
    }
}
