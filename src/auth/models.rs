//! Authentication models

use serde::{Deserialize, Serialize};

/// The signed-in user's profile as returned by the profile endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl User {
    /// Check if user is an administrator (`admin` or Spring-style `ROLE_ADMIN`)
    pub fn is_admin(&self) -> bool {
        let role = self.role.to_ascii_lowercase();
        role == "admin" || role == "role_admin"
    }

    /// Up to two uppercase initials from the user's name
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Token returned by login and register. Servers use either `accessToken` or `token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "accessToken", alias = "token", default)]
    pub access_token: Option<String>,
}

impl TokenResponse {
    /// The token, if present and non-empty
    pub fn into_token(self) -> Option<String> {
        self.access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Partial profile update; absent fields are left unchanged server-side
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Password change payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_access_token() {
        let resp: TokenResponse = serde_json::from_str(r#"{"accessToken":"abc"}"#).unwrap();
        assert_eq!(resp.into_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_response_token_alias() {
        let resp: TokenResponse = serde_json::from_str(r#"{"token":"xyz"}"#).unwrap();
        assert_eq!(resp.into_token().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_token_response_missing_or_empty() {
        let resp: TokenResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert_eq!(resp.into_token(), None);

        let resp: TokenResponse = serde_json::from_str(r#"{"accessToken":"  "}"#).unwrap();
        assert_eq!(resp.into_token(), None);
    }

    #[test]
    fn test_register_request_omits_missing_name() {
        let req = RegisterRequest {
            name: None,
            email: "a@b.c".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_user_helpers() {
        let user = User {
            id: 1,
            name: "dodi firmansyah".to_string(),
            email: "dodi@example.com".to_string(),
            role: "ROLE_ADMIN".to_string(),
        };
        assert!(user.is_admin());
        assert_eq!(user.initials(), "DF");
    }

    #[test]
    fn test_password_change_wire_names() {
        let change = PasswordChange {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["currentPassword"], "old");
        assert_eq!(json["newPassword"], "new");
    }
}
