//! One-Shot Token Value Object
//!
//! Single-use opaque token with an absolute expiry, backing the email
//! verification and password reset flows. The token value is a nanoid;
//! comparison against a presented candidate is constant-time.

use chrono::{DateTime, Duration, Utc};
use nid::Nanoid;
use platform::crypto::constant_time_eq;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotToken {
    value: Nanoid,
    expires_at: DateTime<Utc>,
}

impl OneShotToken {
    /// Issues a fresh token valid for `ttl_secs` from now.
    pub fn issue(ttl_secs: i64) -> Self {
        Self {
            value: Nanoid::new(),
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        }
    }

    pub fn from_parts(value: Nanoid, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Constant-time match against a candidate presented by a client.
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.value.as_str().as_bytes(), candidate.as_bytes())
    }
}
