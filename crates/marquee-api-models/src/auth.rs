//! Login and registration DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Trimmed email address.
    pub email: String,
    /// Password as typed.
    pub password: String,
    /// Always `true` for the admin panel.
    pub admin: bool,
}

/// Body of `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Trimmed display name.
    pub name: String,
    /// Trimmed, lowercased email address.
    pub email: String,
    /// Password as typed.
    pub password: String,
    #[serde(rename = "isAdmin")]
    /// Request the administrator role.
    pub is_admin: bool,
}

/// User object cached alongside the bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    /// Backend identifier.
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Email address.
    pub email: Option<String>,
    #[serde(rename = "isAdmin", default)]
    /// Whether the user holds the administrator role.
    pub is_admin: bool,
    #[serde(default, skip_serializing)]
    /// Token embedded in the login response; never written back out.
    pub token: Option<String>,
    #[serde(flatten)]
    /// Remaining user fields, preserved verbatim.
    pub extra: Map<String, Value>,
}

/// Response of `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    /// Newly created user.
    pub user: AdminUser,
    /// Bearer token issued for the new session.
    pub token: String,
}

/// Response of `GET /users/has-admin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HasAdminResponse {
    #[serde(rename = "hasAdmin")]
    /// Whether an administrator account already exists.
    pub has_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_user_drops_token_when_cached() {
        let user: AdminUser = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Root",
            "email": "root@example.com",
            "isAdmin": true,
            "token": "abc",
            "role": "admin"
        }))
        .expect("user should decode");
        assert_eq!(user.token.as_deref(), Some("abc"));

        let cached = serde_json::to_value(&user).expect("serialize");
        assert!(cached.get("token").is_none());
        assert_eq!(cached.get("role"), Some(&json!("admin")));
    }

    #[test]
    fn register_request_uses_backend_key_names() {
        let body = serde_json::to_value(RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            is_admin: true,
        })
        .expect("serialize");
        assert_eq!(body["isAdmin"], json!(true));
    }
}
