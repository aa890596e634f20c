//! Token claims: the structured payload inside a compact signed token.
//!
//! Claims are *derived* data — they are re-decoded from the raw token
//! string on demand, never stored separately. The backend verifies the
//! signature; this side only reads the payload and fails closed on
//! anything it cannot make sense of.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// The decoded payload of an access token.
///
/// Every field is optional because the payload is controlled by the
/// backend and may omit any of them. The expiry rules treat a missing
/// `exp` as "already expired" — a token we cannot date is a token we
/// do not trust.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject identifier (usually the username or numeric user id).
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiry instant, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued-at instant, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,

    /// Account email, when the backend includes it in the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Raw role strings as issued (e.g. `"ROLE_USER"`); normalization
    /// happens in [`Role::normalize`](crate::Role::normalize).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Claims {
    /// Whether the token is expired at the given instant (Unix seconds).
    ///
    /// Expired means `exp <= now`; a token with no `exp` claim is always
    /// expired (fail closed). The strict edge means a token is never
    /// trusted past its nominal expiry, even briefly — stale credentials
    /// found at startup are discarded rather than ridden out.
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        match self.exp {
            Some(exp) => exp <= now_unix,
            None => true,
        }
    }

    /// Whether the token is expired right now (wall clock).
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }
}

/// Current wall-clock time as seconds since the Unix epoch.
///
/// A clock before the epoch reads as 0, which makes every real token
/// look valid rather than panicking — acceptable for a situation that
/// only occurs on a badly misconfigured host.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
