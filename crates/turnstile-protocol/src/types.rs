//! The identity model and the credential-endpoint wire types.
//!
//! Wire bodies use camelCase JSON to match the backend's conventions.
//! [`User`] is the application-facing projection: one normalized record
//! built from whatever the latest token and login response provided.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Claims;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The closed set of roles an account can hold.
///
/// The backend issues role strings like `"ROLE_ADMIN"`; anything that
/// doesn't normalize to one of these three falls back to [`Role::User`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
    Organizer,
}

impl Role {
    /// Normalizes a raw role string from the backend.
    ///
    /// Upper-cases, strips a leading `ROLE_` namespace prefix, and maps
    /// unknown or absent values to [`Role::User`].
    pub fn normalize(raw: Option<&str>) -> Role {
        let Some(raw) = raw else {
            return Role::User;
        };
        let upper = raw.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "ADMIN" => Role::Admin,
            "ORGANIZER" => Role::Organizer,
            _ => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Organizer => "ORGANIZER",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The currently authenticated identity, normalized.
///
/// Exactly one (or none) exists at any time, owned by the session layer.
/// This is also the record persisted next to the raw token, so it derives
/// the serde traits with the same camelCase wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Builds the normalized user out of an authentication response,
    /// filling gaps from the decoded token claims.
    ///
    /// Response fields win; claims are the fallback; timestamps default
    /// to now (RFC 3339) when neither side provides them. The role comes
    /// from the first role the response (or claims) lists, normalized.
    pub fn from_response(response: &AuthResponse, claims: Option<&Claims>) -> User {
        let now = chrono::Utc::now().to_rfc3339();

        let role_raw = response
            .roles
            .first()
            .map(String::as_str)
            .or_else(|| {
                claims
                    .and_then(|c| c.roles.as_ref())
                    .and_then(|r| r.first())
                    .map(String::as_str)
            });

        let email = if response.email.is_empty() {
            claims
                .and_then(|c| c.email.clone())
                .unwrap_or_default()
        } else {
            response.email.clone()
        };

        User {
            id: response.id,
            username: response.username.clone(),
            email,
            first_name: response
                .first_name
                .clone()
                .or_else(|| claims.and_then(|c| c.first_name.clone()))
                .unwrap_or_default(),
            last_name: response
                .last_name
                .clone()
                .or_else(|| claims.and_then(|c| c.last_name.clone()))
                .unwrap_or_default(),
            role: Role::normalize(role_raw),
            created_at: response.created_at.clone().unwrap_or_else(|| now.clone()),
            updated_at: response.updated_at.clone().unwrap_or(now),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of the sign-in endpoints (standard and elevated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of the registration endpoint. Pass-through: registration does
/// not establish a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// What the credential endpoints return on success.
///
/// The profile fields are optional — different backend versions include
/// different subsets, and [`User::from_response`] fills the gaps from the
/// token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Generic `{"message": …}` body used by several endpoints, both for
/// plain acknowledgements and for error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response_for(username: &str, roles: &[&str]) -> AuthResponse {
        AuthResponse {
            access_token: "t".into(),
            token_type: "Bearer".into(),
            id: 7,
            username: username.into(),
            email: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            first_name: None,
            last_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    // =====================================================================
    // Role::normalize
    // =====================================================================

    #[test]
    fn test_normalize_strips_role_prefix() {
        assert_eq!(Role::normalize(Some("ROLE_ADMIN")), Role::Admin);
        assert_eq!(Role::normalize(Some("ROLE_ORGANIZER")), Role::Organizer);
        assert_eq!(Role::normalize(Some("ROLE_USER")), Role::User);
    }

    #[test]
    fn test_normalize_upper_cases_input() {
        assert_eq!(Role::normalize(Some("admin")), Role::Admin);
        assert_eq!(Role::normalize(Some("role_organizer")), Role::Organizer);
    }

    #[test]
    fn test_normalize_unknown_defaults_to_user() {
        assert_eq!(Role::normalize(Some("ROLE_SUPERVISOR")), Role::User);
        assert_eq!(Role::normalize(Some("")), Role::User);
    }

    #[test]
    fn test_normalize_missing_defaults_to_user() {
        assert_eq!(Role::normalize(None), Role::User);
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
    }

    // =====================================================================
    // User::from_response
    // =====================================================================

    #[test]
    fn test_from_response_uses_response_fields_first() {
        let mut resp = response_for("bob", &["ROLE_USER"]);
        resp.email = "bob@example.com".into();
        resp.first_name = Some("Bob".into());

        let claims = Claims {
            email: Some("stale@example.com".into()),
            first_name: Some("Robert".into()),
            ..Claims::default()
        };

        let user = User::from_response(&resp, Some(&claims));
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.first_name, "Bob");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_from_response_falls_back_to_claims() {
        let resp = response_for("bob", &[]);
        let claims = Claims {
            email: Some("bob@example.com".into()),
            last_name: Some("Builder".into()),
            roles: Some(vec!["ROLE_ORGANIZER".into()]),
            ..Claims::default()
        };

        let user = User::from_response(&resp, Some(&claims));
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.last_name, "Builder");
        assert_eq!(user.role, Role::Organizer);
    }

    #[test]
    fn test_from_response_without_claims_defaults() {
        let resp = response_for("bob", &[]);
        let user = User::from_response(&resp, None);
        assert_eq!(user.role, Role::User);
        assert!(user.email.is_empty());
        assert!(!user.created_at.is_empty(), "timestamps default to now");
    }

    // =====================================================================
    // Wire shapes
    // =====================================================================

    #[test]
    fn test_auth_response_deserializes_camel_case() {
        let json = r#"{
            "accessToken": "abc",
            "tokenType": "Bearer",
            "id": 7,
            "username": "bob",
            "email": "bob@example.com",
            "roles": ["ROLE_USER"],
            "firstName": "Bob"
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "abc");
        assert_eq!(resp.id, 7);
        assert_eq!(resp.first_name.as_deref(), Some("Bob"));
        assert_eq!(resp.last_name, None);
    }

    #[test]
    fn test_auth_response_tolerates_missing_optional_fields() {
        // Minimum viable response: token plus identity.
        let json = r#"{"accessToken": "abc", "id": 1, "username": "a"}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.roles.is_empty());
        assert!(resp.email.is_empty());
    }

    #[test]
    fn test_user_round_trips_through_json() {
        let user = User {
            id: 7,
            username: "bob".into(),
            email: "bob@example.com".into(),
            first_name: "Bob".into(),
            last_name: "Builder".into(),
            role: Role::Organizer,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-02T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn test_register_request_omits_absent_phone() {
        let req = RegisterRequest {
            username: "bob".into(),
            email: "b@e.com".into(),
            password: "pw".into(),
            first_name: "Bob".into(),
            last_name: "B".into(),
            phone: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("phone"));
    }
}
