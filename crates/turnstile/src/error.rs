//! Unified error type for the Turnstile client stack.

use turnstile_client::GuardError;
use turnstile_session::AuthError;
use turnstile_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `turnstile` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TurnstileError {
    /// An authentication-flow error (login, refresh, privilege).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A credential-store error (open, read, serialize).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A guarded-request error (401, transport).
    #[error(transparent)]
    Guard(#[from] GuardError),
}
