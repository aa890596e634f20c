//! Wire types and token handling for Turnstile.
//!
//! This crate defines the "vocabulary" the rest of the stack speaks:
//!
//! - **Claims** ([`Claims`]) — the structured payload carried inside a
//!   compact signed token, and the expiry rules derived from it.
//! - **Codec** ([`decode`], [`encode_unsigned`]) — turning a raw token
//!   string into claims (and back, for test fixtures).
//! - **Model** ([`User`], [`Role`]) — the normalized, application-facing
//!   identity, projected from a token plus login-response fields.
//! - **Wire types** ([`AuthResponse`], [`LoginRequest`], …) — the request
//!   and response bodies of the credential endpoints.
//!
//! # Architecture
//!
//! This layer is pure: no I/O, no clocks other than the ones callers pass
//! in via `*_at` methods (wall-clock convenience wrappers exist but defer
//! to those). Everything stateful lives in the session layer above.
//!
//! ```text
//! Client (HTTP) → Protocol (Claims, User) → Session (lifecycle)
//! ```

mod claims;
pub mod codec;
mod types;

pub use claims::{Claims, unix_now};
pub use codec::{decode, encode_unsigned};
pub use types::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, Role, User,
};
