//! Session lifecycle management for Turnstile.
//!
//! This crate owns the one piece of the application with real state:
//!
//! 1. **Observable state** — "current user or none" ([`SessionState`])
//! 2. **Proactive renewal** — a one-shot timer armed ahead of token
//!    expiry ([`RefreshScheduler`])
//! 3. **Orchestration** — login, logout, silent refresh with
//!    at-most-one-in-flight de-duplication, startup restore
//!    ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client layer (above)  ← attaches tokens to requests, reacts to 401s
//!     ↕
//! Session layer (this crate)  ← owns the credential lifecycle
//!     ↕
//! Protocol + Store layers (below)  ← claims/model types, persistence
//! ```
//!
//! The network is behind the [`AuthApi`] trait so the manager can be
//! driven by a mock in tests and by reqwest in production.

#![allow(async_fn_in_trait)]

mod api;
mod config;
mod error;
mod manager;
mod scheduler;
mod state;

pub use api::AuthApi;
pub use config::SessionConfig;
pub use error::AuthError;
pub use manager::SessionManager;
pub use scheduler::RefreshScheduler;
pub use state::SessionState;
