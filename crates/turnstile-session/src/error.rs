//! Error types for the session layer.

/// Errors surfaced by login, registration, and silent refresh.
///
/// Variants are `Clone` because a refresh outcome is broadcast to every
/// caller that was waiting on the same in-flight attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The sign-in endpoint rejected the credentials (4xx).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// An elevated login succeeded but the account does not hold the
    /// ADMIN role. The session has already been torn down when this is
    /// returned — an admin login attempt never leaves a non-admin
    /// session installed.
    #[error("admin access required")]
    InsufficientPrivilege,

    /// The request never got a usable response (DNS, connect, TLS, …).
    #[error("network error: {0}")]
    Network(String),

    /// The backend failed (5xx).
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// The refresh endpoint rejected the credential, the request timed
    /// out, or the refreshed token could not be installed. The session
    /// is Anonymous when this is returned.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// A response carried no access token, or one whose claims could not
    /// be decoded or carry no expiry. Nothing was installed.
    #[error("response carried a malformed access token")]
    MalformedToken,
}
