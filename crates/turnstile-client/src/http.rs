//! The HTTP backend for the credential endpoints.

use reqwest::{Response, StatusCode};

use turnstile_protocol::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest,
};
use turnstile_session::{AuthApi, AuthError};

/// Calls the backend's credential endpoints over HTTP.
///
/// Stateless apart from the connection pool inside [`reqwest::Client`];
/// cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Creates an API client for the backend at `base_url` (no trailing
    /// slash; `/auth/...` is appended per endpoint).
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Pulls the human-readable message out of an error response,
    /// preferring the backend's `{"message": …}` body over raw text.
    async fn error_message(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<MessageResponse>(&body) {
            Ok(parsed) => parsed.message,
            Err(_) if !body.is_empty() => body,
            Err(_) => status.to_string(),
        }
    }

    /// Maps a non-success response: 5xx to [`AuthError::Server`],
    /// everything else through `rejected`.
    async fn reject(
        response: Response,
        rejected: impl FnOnce(String) -> AuthError,
    ) -> AuthError {
        let status = response.status();
        let message = Self::error_message(response).await;
        if status.is_server_error() {
            AuthError::Server {
                status: status.as_u16(),
                message,
            }
        } else {
            rejected(message)
        }
    }
}

impl AuthApi for HttpAuthApi {
    async fn sign_in(
        &self,
        request: LoginRequest,
        elevated: bool,
    ) -> Result<AuthResponse, AuthError> {
        let path = if elevated {
            "/auth/admin/signin"
        } else {
            "/auth/signin"
        };
        tracing::debug!(path, username = %request.username, "signing in");

        let response = self
            .http
            .post(self.endpoint(path))
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status().is_success() {
            response
                .json::<AuthResponse>()
                .await
                .map_err(|e| AuthError::Network(e.to_string()))
        } else {
            Err(Self::reject(response, AuthError::InvalidCredentials).await)
        }
    }

    async fn refresh(&self, token: &str) -> Result<AuthResponse, AuthError> {
        tracing::debug!("requesting token refresh");

        let response = self
            .http
            .post(self.endpoint("/auth/refresh"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status().is_success() {
            response
                .json::<AuthResponse>()
                .await
                .map_err(|e| AuthError::Network(e.to_string()))
        } else {
            Err(Self::reject(response, AuthError::RefreshFailed).await)
        }
    }

    async fn sign_up(
        &self,
        request: RegisterRequest,
    ) -> Result<MessageResponse, AuthError> {
        tracing::debug!(username = %request.username, "registering account");

        let response = self
            .http
            .post(self.endpoint("/auth/signup"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<MessageResponse>()
                .await
                .map_err(|e| AuthError::Network(e.to_string()))
        } else if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
            // Signup rejections (taken username, invalid email) carry
            // their reason in the message body.
            Err(AuthError::InvalidCredentials(
                Self::error_message(response).await,
            ))
        } else {
            Err(AuthError::Server {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            })
        }
    }
}
