//! Integration tests for [`RequestGuard`]: bearer attachment and the
//! 401 logout-and-redirect path, against a real local server.

mod support;

use std::sync::{Arc, Mutex};

use reqwest::Method;
use support::{CannedResponse, TestServer};

use turnstile_client::{GuardError, HttpAuthApi, Navigator, RequestGuard};
use turnstile_protocol::{Claims, User, codec, unix_now};
use turnstile_session::{SessionConfig, SessionManager};
use turnstile_store::{CredentialStore, MemoryKv};

/// Records redirect calls instead of navigating anywhere.
#[derive(Default)]
struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, return_url: &str) {
        self.redirects.lock().unwrap().push(return_url.to_string());
    }
}

fn token() -> String {
    codec::encode_unsigned(&Claims {
        sub: Some("bob".into()),
        exp: Some(unix_now() + 3600),
        iat: Some(unix_now()),
        email: Some("bob@example.com".into()),
        first_name: None,
        last_name: None,
        roles: Some(vec!["ROLE_USER".into()]),
    })
}

/// A guard whose manager already holds a session for "bob".
fn authenticated_guard(
    base_url: &str,
) -> (
    RequestGuard<HttpAuthApi, Arc<MemoryKv>, Arc<RecordingNavigator>>,
    Arc<RecordingNavigator>,
    String,
) {
    let token = token();
    let kv = Arc::new(MemoryKv::new());
    let seed = CredentialStore::new(Arc::clone(&kv));
    let user = User {
        id: 7,
        username: "bob".into(),
        email: "bob@example.com".into(),
        first_name: String::new(),
        last_name: String::new(),
        role: turnstile_protocol::Role::User,
        created_at: String::new(),
        updated_at: String::new(),
    };
    seed.save(&token, &user);

    let http = reqwest::Client::new();
    let manager = SessionManager::new(
        HttpAuthApi::new(http.clone(), base_url),
        CredentialStore::new(kv),
        SessionConfig::default(),
    );
    manager.restore();
    assert!(manager.is_authenticated());

    let navigator = Arc::new(RecordingNavigator::default());
    let guard = RequestGuard::new(manager, Arc::clone(&navigator), http);
    (guard, navigator, token)
}

#[tokio::test]
async fn test_send_attaches_the_bearer_token() {
    let server =
        TestServer::start(vec![CannedResponse::json(200, r#"{"events":[]}"#)]).await;
    let (guard, _navigator, token) = authenticated_guard(&server.base_url);

    let url = format!("{}/api/events", server.base_url);
    let request = guard.request(Method::GET, &url);
    let response = guard.send(request, "/events").await.unwrap();

    assert_eq!(response.status(), 200);
    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/events");
    assert_eq!(
        requests[0].authorization,
        Some(format!("Bearer {token}"))
    );
}

#[tokio::test]
async fn test_send_skips_the_bearer_on_credential_endpoints() {
    let server = TestServer::start(vec![CannedResponse::json(
        200,
        r#"{"message":"ok"}"#,
    )])
    .await;
    let (guard, _navigator, _token) = authenticated_guard(&server.base_url);

    let url = format!("{}/auth/signin", server.base_url);
    let request = guard.request(Method::POST, &url);
    guard.send(request, "/login").await.unwrap();

    assert!(server.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn test_send_without_a_session_goes_out_unauthenticated() {
    let server =
        TestServer::start(vec![CannedResponse::json(200, r#"{"events":[]}"#)]).await;
    let http = reqwest::Client::new();
    let manager = SessionManager::new(
        HttpAuthApi::new(http.clone(), &server.base_url),
        CredentialStore::new(MemoryKv::new()),
        SessionConfig::default(),
    );
    let navigator = Arc::new(RecordingNavigator::default());
    let guard = RequestGuard::new(manager, Arc::clone(&navigator), http);

    let url = format!("{}/api/events", server.base_url);
    let request = guard.request(Method::GET, &url);
    guard.send(request, "/events").await.unwrap();

    assert!(server.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn test_unauthorized_response_ends_the_session_and_redirects() {
    let server = TestServer::start(vec![CannedResponse::json(
        401,
        r#"{"message":"token expired"}"#,
    )])
    .await;
    let (guard, navigator, _token) = authenticated_guard(&server.base_url);

    let url = format!("{}/api/bookings", server.base_url);
    let request = guard.request(Method::GET, &url);
    let error = guard.send(request, "/bookings/new").await.unwrap_err();

    match error {
        GuardError::Unauthorized { url } => assert!(url.ends_with("/api/bookings")),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    // The session was torn down and the user sent to login with a way
    // back to where they were.
    assert!(!guard.manager().is_authenticated());
    assert!(guard.manager().current_token().is_none());
    assert_eq!(navigator.redirects(), vec!["/bookings/new".to_string()]);
}

#[tokio::test]
async fn test_non_401_failures_pass_through_with_the_session_intact() {
    let server = TestServer::start(vec![CannedResponse::json(
        403,
        r#"{"message":"organizer role required"}"#,
    )])
    .await;
    let (guard, navigator, _token) = authenticated_guard(&server.base_url);

    let url = format!("{}/api/events", server.base_url);
    let request = guard.request(Method::POST, &url);
    let response = guard.send(request, "/events").await.unwrap();

    // 403 is an authorization answer for the caller to handle, not a
    // session death.
    assert_eq!(response.status(), 403);
    assert!(guard.manager().is_authenticated());
    assert!(navigator.redirects().is_empty());
}
