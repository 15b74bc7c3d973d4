//! Account and authentication payloads.

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub role: String,
    pub provider: String,
    /// `pluginKey`s the user has installed.
    pub plugins: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub type RefreshTokenResponse = LoginResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPasswordReset {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPasswordResetResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    pub user_id: String,
    pub token: String,
    pub password: String,
    #[serde(rename = "confirm_password", skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

impl RegisterUser {
    /// False only when a confirmation was sent and differs.
    pub fn passwords_match(&self) -> bool {
        self.confirm_password.as_ref().is_none_or(|c| c == &self.password)
    }
}

impl ResetPassword {
    pub fn passwords_match(&self) -> bool {
        self.confirm_password.as_ref().is_none_or(|c| c == &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_response_shape() {
        let value = json!({
            "token": "abc123",
            "user": {
                "id": "u1",
                "username": "bob",
                "email": "b@x.com",
                "name": "Bob",
                "avatar": "",
                "role": "user",
                "provider": "local",
                "plugins": [],
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }
        });
        let login: LoginResponse = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(login.user.username, "bob");
        assert_eq!(serde_json::to_value(&login).unwrap(), value);
    }

    #[test]
    fn reset_password_keeps_snake_case_confirmation() {
        let reset: ResetPassword = serde_json::from_value(json!({
            "userId": "u1",
            "token": "t",
            "password": "hunter22",
            "confirm_password": "hunter2"
        }))
        .unwrap();
        assert!(!reset.passwords_match());
        let out = serde_json::to_value(&reset).unwrap();
        assert_eq!(out["confirm_password"], "hunter2");
        assert_eq!(out["userId"], "u1");
    }

    #[test]
    fn registration_without_confirmation() {
        let user: RegisterUser = serde_json::from_value(json!({
            "name": "Ann", "email": "a@x.com", "username": "ann", "password": "pw"
        }))
        .unwrap();
        assert!(user.passwords_match());
        assert!(serde_json::to_value(&user).unwrap().get("confirm_password").is_none());
    }
}
