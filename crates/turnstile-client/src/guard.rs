//! The authenticated request guard: bearer attachment on the way out,
//! 401 handling on the way back.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};

use turnstile_session::{AuthApi, SessionManager};
use turnstile_store::KvStore;

use crate::GuardError;

/// Where to send the user when a session ends involuntarily.
///
/// The guard calls this exactly once per rejected request, after the
/// session has been torn down, passing the path the user was on so the
/// login flow can return there afterwards.
pub trait Navigator: Send + Sync + 'static {
    fn redirect_to_login(&self, return_url: &str);
}

/// A shared navigator is itself a navigator, so callers can keep a
/// handle to the one they hand the guard.
impl<N: Navigator> Navigator for Arc<N> {
    fn redirect_to_login(&self, return_url: &str) {
        (**self).redirect_to_login(return_url)
    }
}

/// Wraps outgoing application requests in the session lifecycle.
///
/// Every request sent through the guard carries the current bearer
/// token (credential endpoints excepted, they authenticate by body or
/// carry their own token). A 401 response means the backend no longer
/// honors the credential: the guard logs the session out, redirects via
/// the [`Navigator`], and surfaces [`GuardError::Unauthorized`].
pub struct RequestGuard<A: AuthApi, K: KvStore, N: Navigator> {
    manager: SessionManager<A, K>,
    navigator: Arc<N>,
    http: reqwest::Client,
}

impl<A: AuthApi, K: KvStore, N: Navigator> Clone for RequestGuard<A, K, N> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            navigator: Arc::clone(&self.navigator),
            http: self.http.clone(),
        }
    }
}

/// Credential endpoints authenticate by request body, not by bearer.
fn is_credential_endpoint(path: &str) -> bool {
    path.ends_with("/auth/signin")
        || path.ends_with("/auth/admin/signin")
        || path.ends_with("/auth/signup")
}

impl<A: AuthApi, K: KvStore, N: Navigator> RequestGuard<A, K, N> {
    pub fn new(
        manager: SessionManager<A, K>,
        navigator: N,
        http: reqwest::Client,
    ) -> Self {
        Self {
            manager,
            navigator: Arc::new(navigator),
            http,
        }
    }

    /// Starts a request to be finished with [`send`](Self::send). The
    /// builder is a plain [`reqwest::RequestBuilder`]; body, query, and
    /// extra headers go on as usual.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Sends a built request with the session attached.
    ///
    /// `current_path` is where the user currently is; on a 401 it is
    /// handed to the navigator as the return destination.
    ///
    /// # Errors
    /// - [`GuardError::Unauthorized`] — the backend answered 401; the
    ///   session is already cleared and the redirect already issued.
    /// - [`GuardError::Transport`] — the request could not be built or
    ///   never produced a response.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        current_path: &str,
    ) -> Result<Response, GuardError> {
        let mut request = builder.build()?;

        if !is_credential_endpoint(request.url().path()) {
            if let Some(token) = self.manager.current_token() {
                match HeaderValue::from_str(&format!("Bearer {token}")) {
                    Ok(value) => {
                        request.headers_mut().insert(AUTHORIZATION, value);
                    }
                    Err(_) => tracing::warn!(
                        "installed token is not a valid header value; \
                         sending unauthenticated"
                    ),
                }
            }
        }

        let response = self.http.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let url = response.url().to_string();
            tracing::warn!(%url, "request rejected as unauthorized; ending session");
            self.manager.logout();
            self.navigator.redirect_to_login(current_path);
            return Err(GuardError::Unauthorized { url });
        }

        Ok(response)
    }

    /// The session this guard attaches.
    pub fn manager(&self) -> &SessionManager<A, K> {
        &self.manager
    }
}

// =========================================================================
// Tests
// =========================================================================
