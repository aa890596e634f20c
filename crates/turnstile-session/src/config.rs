//! Session behavior knobs.

use std::time::Duration;

/// Configuration for the session manager and refresh scheduler.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How far ahead of token expiry the proactive renewal fires.
    ///
    /// Default: 5 minutes. A token whose remaining lifetime is already
    /// shorter than this is *not* refreshed immediately — it is left to
    /// the next explicit check (see
    /// [`RefreshScheduler::arm`](crate::RefreshScheduler::arm)).
    pub renewal_lead: Duration,

    /// Upper bound on a refresh network call, and on how long a caller
    /// waits for someone else's in-flight refresh. Hitting it surfaces
    /// [`AuthError::RefreshFailed`](crate::AuthError::RefreshFailed).
    ///
    /// Default: 10 seconds.
    pub refresh_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_lead: Duration::from_secs(5 * 60),
            refresh_timeout: Duration::from_secs(10),
        }
    }
}
