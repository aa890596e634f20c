//! Error types for the store layer.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
///
/// Callers above the [`CredentialStore`](crate::CredentialStore) never see
/// these — persistence is best-effort and failures are logged there — but
/// the [`KvStore`](crate::KvStore) seam reports them so the store can
/// decide what to swallow.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying key/value backend failed (I/O, corruption, locks).
    #[error("storage error: {0}")]
    Storage(String),

    /// A record could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
