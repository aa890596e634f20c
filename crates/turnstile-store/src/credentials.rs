//! The credential store: the raw token and the serialized user, kept
//! under two fixed keys that live and die together.

use turnstile_protocol::User;

use crate::kv::KvStore;

/// Key holding the raw access-token string.
pub const TOKEN_KEY: &str = "auth_token";

/// Key holding the serialized [`User`] record.
pub const USER_KEY: &str = "auth_user";

/// Persists the current credential pair.
///
/// Invariant: the two keys are written in one transaction and cleared in
/// one transaction. A reader that finds only one of them must treat the
/// pair as absent — [`load_token`](Self::load_token) and
/// [`load_user`](Self::load_user) expose the halves so the session layer
/// can detect and clear a torn pair at startup.
pub struct CredentialStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> CredentialStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Persists the token and user together. Best-effort: a failure is
    /// logged and swallowed, leaving the in-memory session authoritative
    /// for the current process lifetime.
    pub fn save(&self, token: &str, user: &User) {
        let payload = match serde_json::to_vec(user) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(%error, "failed to serialize user; credentials not persisted");
                return;
            }
        };

        if let Err(error) = self
            .kv
            .put_many(&[(TOKEN_KEY, token.as_bytes()), (USER_KEY, &payload)])
        {
            tracing::error!(%error, "failed to persist credentials; session will not survive a restart");
        }
    }

    /// The persisted raw token string, if any.
    pub fn load_token(&self) -> Option<String> {
        match self.kv.get(TOKEN_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "failed to read persisted token");
                None
            }
        }
    }

    /// The persisted user record, if any. An unparseable record reads as
    /// absent.
    pub fn load_user(&self) -> Option<User> {
        match self.kv.get(USER_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::warn!(%error, "persisted user record is unreadable; treating as absent");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "failed to read persisted user");
                None
            }
        }
    }

    /// Removes both halves of the pair. Idempotent, best-effort.
    pub fn clear(&self) {
        if let Err(error) = self.kv.delete_many(&[TOKEN_KEY, USER_KEY]) {
            tracing::error!(%error, "failed to clear persisted credentials");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use turnstile_protocol::Role;

    use super::*;
    use crate::MemoryKv;

    fn user() -> User {
        User {
            id: 7,
            username: "bob".into(),
            email: "bob@example.com".into(),
            first_name: "Bob".into(),
            last_name: "Builder".into(),
            role: Role::User,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_save_then_load_returns_matching_pair() {
        let store = CredentialStore::new(MemoryKv::new());
        store.save("raw-token", &user());

        assert_eq!(store.load_token().as_deref(), Some("raw-token"));
        assert_eq!(store.load_user(), Some(user()));
    }

    #[test]
    fn test_clear_removes_both_halves() {
        let store = CredentialStore::new(MemoryKv::new());
        store.save("raw-token", &user());
        store.clear();

        assert_eq!(store.load_token(), None);
        assert_eq!(store.load_user(), None);
    }

    #[test]
    fn test_clear_on_empty_store_is_idempotent() {
        let store = CredentialStore::new(MemoryKv::new());
        store.clear();
        store.clear();
        assert_eq!(store.load_token(), None);
    }

    #[test]
    fn test_load_user_with_corrupt_record_reads_as_absent() {
        let kv = MemoryKv::new();
        kv.put_many(&[(USER_KEY, b"not json".as_slice())]).unwrap();
        let store = CredentialStore::new(kv);

        assert_eq!(store.load_user(), None);
    }

    #[test]
    fn test_save_overwrites_previous_pair() {
        let store = CredentialStore::new(MemoryKv::new());
        store.save("first", &user());
        let mut second = user();
        second.username = "alice".into();
        store.save("second", &second);

        assert_eq!(store.load_token().as_deref(), Some("second"));
        assert_eq!(store.load_user().map(|u| u.username), Some("alice".into()));
    }
}
