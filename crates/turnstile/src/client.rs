//! `TurnstileClient` builder and the assembled client.
//!
//! This is the entry point for embedding Turnstile in an application.
//! It ties together all the layers: HTTP endpoints → session manager →
//! credential store → request guard.

use std::path::PathBuf;

use turnstile_client::{HttpAuthApi, Navigator, RequestGuard};
use turnstile_session::{SessionConfig, SessionManager};
use turnstile_store::{CredentialStore, RedbKv};

use crate::TurnstileError;

/// Builder for configuring and assembling a [`TurnstileClient`].
///
/// # Example
///
/// ```rust,ignore
/// use turnstile::prelude::*;
///
/// let client = TurnstileClientBuilder::new("https://api.example.com")
///     .store_path("/var/lib/myapp/session.redb")
///     .build(my_navigator)?;
/// client.manager().login(credentials, false).await?;
/// ```
pub struct TurnstileClientBuilder {
    base_url: String,
    store_path: PathBuf,
    session_config: SessionConfig,
}

impl TurnstileClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            store_path: PathBuf::from("turnstile.redb"),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets where the credential store lives on disk.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Sets the session configuration (renewal lead, refresh timeout).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Opens the store, assembles the stack, and restores any persisted
    /// session.
    ///
    /// Must be called from within a tokio runtime: restoring a valid
    /// persisted session arms the renewal timer, which spawns a task.
    ///
    /// # Errors
    /// [`TurnstileError::Store`] if the credential store cannot be
    /// opened at the configured path.
    pub fn build<N: Navigator>(
        self,
        navigator: N,
    ) -> Result<TurnstileClient<N>, TurnstileError> {
        let kv = RedbKv::open(&self.store_path)?;
        let store = CredentialStore::new(kv);
        let http = reqwest::Client::new();

        let manager = SessionManager::new(
            HttpAuthApi::new(http.clone(), self.base_url),
            store,
            self.session_config,
        );
        manager.restore();

        let guard = RequestGuard::new(manager.clone(), navigator, http);

        tracing::info!(store = %self.store_path.display(), "turnstile client ready");
        Ok(TurnstileClient { manager, guard })
    }
}

/// The assembled client: one session manager and the request guard
/// wired to it.
pub struct TurnstileClient<N: Navigator> {
    manager: SessionManager<HttpAuthApi, RedbKv>,
    guard: RequestGuard<HttpAuthApi, RedbKv, N>,
}

impl<N: Navigator> TurnstileClient<N> {
    /// The session lifecycle: login, logout, refresh, observation.
    pub fn manager(&self) -> &SessionManager<HttpAuthApi, RedbKv> {
        &self.manager
    }

    /// The guard application requests go through.
    pub fn guard(&self) -> &RequestGuard<HttpAuthApi, RedbKv, N> {
        &self.guard
    }
}

// =========================================================================
// Tests
// =========================================================================
