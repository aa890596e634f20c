//! The session manager: login, logout, silent refresh, startup restore.
//!
//! This is the orchestrator of the lifecycle. It owns the in-memory
//! token, the observable state, the credential store, and the renewal
//! timer, and it is the only writer to any of them.
//!
//! # Concurrency
//!
//! The manager is `Clone` (an `Arc` around its internals) and safe to
//! drive from any number of tasks. The one operation where concurrency
//! matters is [`silent_refresh`](SessionManager::silent_refresh): a
//! timer fire can race manual calls, and several rejected API calls can
//! all decide to refresh at the same moment. The in-flight slot below
//! guarantees at most one network call, and every concurrent caller
//! receives that one call's outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{broadcast, watch};

use turnstile_protocol::{
    AuthResponse, Claims, LoginRequest, MessageResponse, RegisterRequest,
    Role, User, codec,
};
use turnstile_store::{CredentialStore, KvStore};

use crate::scheduler::RefreshScheduler;
use crate::{AuthApi, AuthError, SessionConfig, SessionState};

type RefreshOutcome = Result<User, AuthError>;

struct Inner<A: AuthApi, K: KvStore> {
    api: A,
    store: CredentialStore<K>,
    state: SessionState,
    config: SessionConfig,

    /// The raw token currently installed. Authoritative for this
    /// process even when persistence fails.
    token: Mutex<Option<String>>,

    /// The renewal timer. At most one outstanding per manager.
    scheduler: Mutex<RefreshScheduler>,

    /// The in-flight refresh slot. `Some` while an attempt's network
    /// call is pending; latecomers subscribe to the sender instead of
    /// starting a second call.
    inflight: Mutex<Option<broadcast::Sender<RefreshOutcome>>>,

    /// Bumped on every install and logout. A refresh that started under
    /// an older epoch discards its result instead of resurrecting a
    /// session that was replaced or torn down mid-flight.
    epoch: AtomicU64,
}

/// Orchestrates the credential lifecycle.
///
/// ## Lifecycle
///
/// ```text
/// restore() ─┬─→ [Authenticated] ──(timer)──→ silent_refresh() ─┐
///            │         ↑                            │           │
/// login() ───┘         └──── success ───────────────┘           │
///                      │                                        │
///                  logout() ←──────── failure ──────────────────┘
///                      │
///                      ▼
///                 [Anonymous]
/// ```
pub struct SessionManager<A: AuthApi, K: KvStore> {
    inner: Arc<Inner<A, K>>,
}

impl<A: AuthApi, K: KvStore> Clone for SessionManager<A, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Locks a std mutex, recovering from poisoning. The guarded values are
/// plain data that stays consistent even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<A: AuthApi, K: KvStore> SessionManager<A, K> {
    /// Creates a manager in the Anonymous state.
    ///
    /// The renewal timer's hook holds only a `Weak` back-reference, so a
    /// dropped manager cannot be kept alive (or fired into) by its own
    /// timer.
    pub fn new(api: A, store: CredentialStore<K>, config: SessionConfig) -> Self {
        let renewal_lead = config.renewal_lead;
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<A, K>>| {
            let weak = weak.clone();
            let hook = move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                tokio::spawn(async move {
                    let manager = SessionManager { inner };
                    if let Err(error) = manager.silent_refresh().await {
                        tracing::warn!(%error, "scheduled silent refresh failed");
                    }
                });
            };

            Inner {
                api,
                store,
                state: SessionState::new(),
                config,
                token: Mutex::new(None),
                scheduler: Mutex::new(RefreshScheduler::new(renewal_lead, hook)),
                inflight: Mutex::new(None),
                epoch: AtomicU64::new(0),
            }
        });

        Self { inner }
    }

    // -- Startup ----------------------------------------------------------

    /// Restores a persisted session, if a usable one exists.
    ///
    /// A complete pair with a non-expired token is published and the
    /// renewal timer armed from its expiry. An expired token triggers a
    /// full [`logout`](Self::logout) to clear the stale state. A torn
    /// pair (one key without the other) is cleared without publishing.
    pub fn restore(&self) {
        let token = self.inner.store.load_token();
        let user = self.inner.store.load_user();

        match (token, user) {
            (Some(token), Some(user)) => {
                match codec::decode(&token) {
                    Some(claims) if !claims.is_expired() => {
                        *lock(&self.inner.token) = Some(token);
                        self.inner.state.set(Some(user));
                        if let Some(exp) = claims.exp {
                            lock(&self.inner.scheduler).arm(exp);
                        }
                        tracing::info!("restored persisted session");
                    }
                    _ => {
                        tracing::info!("persisted token is stale; clearing session");
                        self.logout();
                    }
                }
            }
            (None, None) => {}
            _ => {
                tracing::warn!("found half of a persisted credential pair; clearing both");
                self.inner.store.clear();
            }
        }
    }

    // -- Login / logout ---------------------------------------------------

    /// Authenticates against the standard endpoint, or the elevated one
    /// when `as_admin` is true.
    ///
    /// On success the token and normalized user are persisted together,
    /// published, and the renewal timer armed. An elevated login that
    /// resolves to a non-admin role is immediately undone.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`] / [`AuthError::Network`] /
    ///   [`AuthError::Server`] — the endpoint rejected or failed; any
    ///   prior session is left untouched.
    /// - [`AuthError::MalformedToken`] — the response token could not be
    ///   decoded; nothing was installed.
    /// - [`AuthError::InsufficientPrivilege`] — `as_admin` with a
    ///   non-admin account; the session is Anonymous afterwards.
    pub async fn login(
        &self,
        credentials: LoginRequest,
        as_admin: bool,
    ) -> Result<User, AuthError> {
        let response = self.inner.api.sign_in(credentials, as_admin).await?;
        self.install(response, as_admin)
    }

    /// Registers a new account. Pass-through — no session results.
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<MessageResponse, AuthError> {
        self.inner.api.sign_up(request).await
    }

    /// Tears the session down: clears the persisted pair, disarms the
    /// renewal timer, publishes Anonymous. Idempotent, any state.
    pub fn logout(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.store.clear();
        *lock(&self.inner.token) = None;
        lock(&self.inner.scheduler).disarm();
        self.inner.state.set(None);
        tracing::info!("session cleared");
    }

    // -- Reads ------------------------------------------------------------

    /// Whether a usable session exists right now: a token is installed,
    /// its claims decode, it is not expired, and a user is published.
    /// All three legs are required — a valid token with no user record
    /// is not authenticated.
    pub fn is_authenticated(&self) -> bool {
        let Some(token) = self.current_token() else {
            return false;
        };
        let Some(claims) = codec::decode(&token) else {
            return false;
        };
        !claims.is_expired() && self.inner.state.current().is_some()
    }

    /// The installed raw token, if any. Pure read.
    pub fn current_token(&self) -> Option<String> {
        lock(&self.inner.token).clone()
    }

    /// The published user, if any. Pure read.
    pub fn current_session(&self) -> Option<User> {
        self.inner.state.current()
    }

    /// Observes every session transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.state.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.current_session()
            .is_some_and(|u| u.role == Role::Admin)
    }

    /// Admins count as organizers for privilege checks.
    pub fn is_organizer(&self) -> bool {
        self.current_session()
            .is_some_and(|u| matches!(u.role, Role::Organizer | Role::Admin))
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.current_session()
            .is_some_and(|u| roles.contains(&u.role))
    }

    // -- Silent refresh ---------------------------------------------------

    /// Renews the current credential without interactive re-login.
    ///
    /// At most one refresh network call is in flight per manager. A
    /// caller that finds one pending waits (bounded by
    /// `refresh_timeout`) for that attempt's outcome instead of starting
    /// a second call; every waiter sees the same success or failure the
    /// leader saw.
    ///
    /// # Errors
    /// [`AuthError::RefreshFailed`] on any failure — rejection, timeout,
    /// or a session change that landed mid-flight. The session is
    /// Anonymous after a failed refresh of the current credential.
    pub async fn silent_refresh(&self) -> Result<User, AuthError> {
        enum Entry {
            Lead(broadcast::Sender<RefreshOutcome>),
            Wait(broadcast::Receiver<RefreshOutcome>),
        }

        // Check-and-set under one lock: either we are the leader or we
        // subscribe to the leader's outcome. No interleaving of refresh
        // triggers can start two network calls.
        let entry = {
            let mut slot = lock(&self.inner.inflight);
            match slot.as_ref() {
                Some(tx) => Entry::Wait(tx.subscribe()),
                None => {
                    let (tx, _rx) = broadcast::channel(1);
                    *slot = Some(tx.clone());
                    Entry::Lead(tx)
                }
            }
        };

        match entry {
            Entry::Wait(mut rx) => {
                tracing::debug!("refresh already in flight; waiting for its outcome");
                match tokio::time::timeout(
                    self.inner.config.refresh_timeout,
                    rx.recv(),
                )
                .await
                {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(_closed)) => Err(AuthError::RefreshFailed(
                        "in-flight refresh ended without a result".into(),
                    )),
                    Err(_elapsed) => Err(AuthError::RefreshFailed(
                        "timed out waiting for the in-flight refresh".into(),
                    )),
                }
            }
            Entry::Lead(tx) => {
                let outcome = self.run_refresh().await;
                // Clear the slot before broadcasting so a caller arriving
                // after completion starts a fresh attempt instead of
                // waiting on a dead channel.
                *lock(&self.inner.inflight) = None;
                let _ = tx.send(outcome.clone());
                outcome
            }
        }
    }

    /// The leader's refresh attempt. A failure of the *current*
    /// credential ends in a full logout — no half-authenticated state is
    /// ever observable. A failure of a credential that was replaced or
    /// torn down mid-flight touches nothing: the newer state wins, on
    /// both the success and the failure path.
    async fn run_refresh(&self) -> RefreshOutcome {
        let Some(token) = self.current_token() else {
            return Err(AuthError::RefreshFailed(
                "no credential to refresh".into(),
            ));
        };

        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        let response = match tokio::time::timeout(
            self.inner.config.refresh_timeout,
            self.inner.api.refresh(&token),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::warn!(%error, "token refresh rejected");
                self.end_session_if_unchanged(epoch);
                return Err(AuthError::RefreshFailed(error.to_string()));
            }
            Err(_elapsed) => {
                tracing::warn!("token refresh timed out");
                self.end_session_if_unchanged(epoch);
                return Err(AuthError::RefreshFailed(
                    "refresh request timed out".into(),
                ));
            }
        };

        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            // A logout or fresh login landed while we were in flight.
            // Their state wins; our result is discarded, not installed.
            tracing::debug!("session changed during refresh; discarding result");
            return Err(AuthError::RefreshFailed(
                "session changed while refresh was in flight".into(),
            ));
        }

        match self.install(response, false) {
            Ok(user) => Ok(user),
            Err(error) => {
                self.end_session_if_unchanged(epoch);
                Err(AuthError::RefreshFailed(error.to_string()))
            }
        }
    }

    /// Logs out only if the session is still the one the failed refresh
    /// was renewing. A logout or fresh login that landed mid-flight
    /// already superseded it, and must not be torn down by a stale
    /// failure.
    fn end_session_if_unchanged(&self, epoch: u64) {
        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            self.logout();
        } else {
            tracing::debug!(
                "session changed during refresh; leaving the newer session in place"
            );
        }
    }

    // -- Install ----------------------------------------------------------

    /// Installs an authentication response: decode, normalize, persist,
    /// publish, arm. The single path shared by login and refresh.
    fn install(
        &self,
        response: AuthResponse,
        require_admin: bool,
    ) -> Result<User, AuthError> {
        let raw = response.access_token.clone();
        if raw.is_empty() {
            return Err(AuthError::MalformedToken);
        }
        // A token whose claims don't decode, or that carries no expiry,
        // can never satisfy is_authenticated — refuse to install it.
        let Some(claims) = codec::decode(&raw).filter(|c| c.exp.is_some()) else {
            return Err(AuthError::MalformedToken);
        };

        let user = User::from_response(&response, Some(&claims));

        if require_admin && user.role != Role::Admin {
            tracing::warn!(
                username = %user.username,
                role = %user.role,
                "elevated login resolved to a non-admin role; undoing authentication"
            );
            self.logout();
            return Err(AuthError::InsufficientPrivilege);
        }

        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        // Persist, then publish: the store writes both keys in one
        // transaction, so no reader sees a token without its user.
        self.inner.store.save(&raw, &user);
        *lock(&self.inner.token) = Some(raw);
        self.inner.state.set(Some(user.clone()));
        self.arm_from(&claims);

        tracing::info!(
            username = %user.username,
            role = %user.role,
            "session established"
        );
        Ok(user)
    }

    fn arm_from(&self, claims: &Claims) {
        if let Some(exp) = claims.exp {
            lock(&self.inner.scheduler).arm(exp);
        }
    }

    // -- Introspection (for collaborators and tests) ----------------------

    /// Whether the renewal timer is currently outstanding.
    pub fn refresh_timer_armed(&self) -> bool {
        lock(&self.inner.scheduler).is_armed()
    }

    /// How long after arming the renewal timer will fire, if armed.
    pub fn refresh_timer_delay(&self) -> Option<std::time::Duration> {
        lock(&self.inner.scheduler).armed_delay()
    }
}
