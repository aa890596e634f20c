//! Durable credential persistence for Turnstile.
//!
//! Two layers:
//!
//! 1. **[`KvStore`]** — a minimal key/value seam with a redb-backed
//!    implementation ([`RedbKv`]) for real deployments and an in-memory
//!    one ([`MemoryKv`]) for tests.
//! 2. **[`CredentialStore`]** — the thing the session layer talks to. It
//!    owns the two fixed keys (raw token, serialized user) and the rule
//!    that they live and die together.
//!
//! # Best-effort persistence
//!
//! All operations are synchronous. A failed save is logged and swallowed:
//! the in-memory session remains authoritative for the current process
//! lifetime, it just won't survive a restart. Logins never fail on a
//! persistence error.

mod credentials;
mod error;
mod kv;

pub use credentials::{CredentialStore, TOKEN_KEY, USER_KEY};
pub use error::StoreError;
pub use kv::{KvStore, MemoryKv, RedbKv};
