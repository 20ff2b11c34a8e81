use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Optional; when supplied it must match `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to clients. Never carries the password
/// hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    #[serde(default)]
    pub google_id: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.effective_roles(),
            google_id: user.google_id.clone(),
        }
    }
}

/// Response returned after register or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_uses_camel_case_keys() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            roles: vec!["ROLE_USER".into()],
            google_id: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("firstName"));
        assert!(json.contains("lastName"));
        assert!(json.contains("googleId"));
        assert!(json.contains("ana@example.com"));
    }

    #[test]
    fn register_request_accepts_missing_confirmation() {
        let payload = r#"{"firstName":"Ana","lastName":"Ruiz","email":"ana@example.com","password":"pw123456"}"#;
        let request: RegisterRequest = serde_json::from_str(payload).unwrap();
        assert!(request.confirm_password.is_none());
    }

    #[test]
    fn auth_response_omits_message_when_absent() {
        let response = AuthResponse {
            message: None,
            token: "tok".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "ana@example.com".into(),
                first_name: "Ana".into(),
                last_name: "Ruiz".into(),
                roles: vec!["ROLE_USER".into()],
                google_id: None,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("message"));
        assert!(json.contains("token"));
    }
}
