//! The network seam: what the session manager needs from the backend.
//!
//! The manager never constructs an HTTP request itself. It asks an
//! [`AuthApi`] for sign-in, refresh, and sign-up, and the implementation
//! decides how those happen — reqwest against the real backend in
//! production, a scripted mock in tests.

use turnstile_protocol::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest,
};

use crate::AuthError;

/// The credential endpoints the session manager drives.
///
/// # Trait bounds
///
/// - `Send + Sync` — the manager is shared across tasks (a timer fire
///   can race a manual login), so the API must be too.
/// - `'static` — the API lives as long as the manager.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchanges credentials for a token at the standard endpoint, or
    /// the elevated one when `elevated` is true.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`] — the endpoint rejected them
    /// - [`AuthError::Network`] / [`AuthError::Server`] — transport or
    ///   backend failure
    fn sign_in(
        &self,
        request: LoginRequest,
        elevated: bool,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send;

    /// Renews the given credential at the refresh endpoint.
    ///
    /// # Errors
    /// Any rejection or transport failure; the manager folds whatever
    /// comes back into [`AuthError::RefreshFailed`].
    fn refresh(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send;

    /// Registers a new account. Pass-through: no session is established.
    fn sign_up(
        &self,
        request: RegisterRequest,
    ) -> impl std::future::Future<Output = Result<MessageResponse, AuthError>> + Send;
}

/// Sharing one API instance between a manager and other observers (call
/// counters in tests, for one) is common, so any shared `AuthApi` is
/// itself an `AuthApi`.
impl<A: AuthApi> AuthApi for std::sync::Arc<A> {
    fn sign_in(
        &self,
        request: LoginRequest,
        elevated: bool,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send
    {
        (**self).sign_in(request, elevated)
    }

    fn refresh(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse, AuthError>> + Send
    {
        (**self).refresh(token)
    }

    fn sign_up(
        &self,
        request: RegisterRequest,
    ) -> impl std::future::Future<Output = Result<MessageResponse, AuthError>> + Send
    {
        (**self).sign_up(request)
    }
}
