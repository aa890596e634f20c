//! HTTP layer for Turnstile.
//!
//! Two pieces live here:
//!
//! - [`HttpAuthApi`] — the credential endpoints (`/auth/signin`,
//!   `/auth/admin/signin`, `/auth/refresh`, `/auth/signup`) behind the
//!   [`AuthApi`](turnstile_session::AuthApi) trait the session manager
//!   consumes.
//! - [`RequestGuard`] — the wrapper application requests go through:
//!   bearer attachment on the way out, logout-and-redirect on a 401 on
//!   the way back.

mod error;
mod guard;
mod http;

pub use error::GuardError;
pub use guard::{Navigator, RequestGuard};
pub use http::HttpAuthApi;
