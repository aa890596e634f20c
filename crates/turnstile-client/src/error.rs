use thiserror::Error;

/// Errors from guarded requests.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The backend answered 401. The session has already been torn down
    /// and the navigator redirected by the time the caller sees this.
    #[error("request to {url} was rejected as unauthorized")]
    Unauthorized { url: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
