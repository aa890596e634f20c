//! The observable "current user or none" holder.

use tokio::sync::watch;

use turnstile_protocol::User;

/// Single source of truth for "is the app authenticated right now".
///
/// A thin wrapper over a [`watch`] channel: the session manager writes,
/// anything interested in auth transitions subscribes. Every [`set`]
/// notifies, including a transition to the same value — subscribers that
/// care can deduplicate, the state itself does not.
///
/// One instance per [`SessionManager`](crate::SessionManager); it is an
/// owned component handed to collaborators, not an ambient global.
pub struct SessionState {
    tx: watch::Sender<Option<User>>,
}

impl SessionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// The currently published user, if any.
    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// Publishes a transition. `None` means Anonymous.
    pub fn set(&self, user: Option<User>) {
        // send_replace notifies even with no receivers and even when the
        // value is unchanged.
        self.tx.send_replace(user);
    }

    /// A receiver that observes every transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
