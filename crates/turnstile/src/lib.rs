//! # Turnstile
//!
//! Session and credential lifecycle for event-booking clients.
//!
//! Turnstile keeps a backend-issued bearer token alive for the duration
//! of a user's session: it logs in, persists the credential pair across
//! restarts, renews the token silently before it expires, attaches it
//! to outgoing requests, and tears everything down the moment the
//! backend stops honoring it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turnstile::prelude::*;
//!
//! # struct MyNavigator;
//! # impl Navigator for MyNavigator {
//! #     fn redirect_to_login(&self, _return_url: &str) {}
//! # }
//! # async fn run() -> Result<(), TurnstileError> {
//! let client = TurnstileClientBuilder::new("https://api.example.com")
//!     .store_path("session.redb")
//!     .build(MyNavigator)?;
//!
//! let user = client
//!     .manager()
//!     .login(
//!         LoginRequest {
//!             username: "bob".into(),
//!             password: "hunter2".into(),
//!         },
//!         false,
//!     )
//!     .await?;
//! println!("signed in as {} ({})", user.username, user.role);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{TurnstileClient, TurnstileClientBuilder};
pub use error::TurnstileError;

pub use turnstile_client::{GuardError, HttpAuthApi, Navigator, RequestGuard};
pub use turnstile_protocol::{
    AuthResponse, Claims, LoginRequest, MessageResponse, RegisterRequest, Role,
    User,
};
pub use turnstile_session::{
    AuthApi, AuthError, SessionConfig, SessionManager, SessionState,
};
pub use turnstile_store::{CredentialStore, KvStore, MemoryKv, RedbKv, StoreError};

/// Everything most applications need, in one import.
pub mod prelude {
    pub use crate::{
        AuthError, LoginRequest, Navigator, RegisterRequest, Role,
        SessionConfig, TurnstileClient, TurnstileClientBuilder, TurnstileError,
        User,
    };
}
