use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::Role;
use crate::utils::validation::{trim, trim_opt};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters long"
    ))]
    pub password: String,
    pub role: Role,
}

impl RegisterPayload {
    pub fn normalize(&mut self) {
        trim(&mut self.first_name);
        trim_opt(&mut self.last_name);
        trim(&mut self.email);
        self.email = self.email.to_lowercase();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters long"
    ))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i32,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_payload_is_trimmed_and_validated() {
        let mut payload: RegisterPayload = serde_json::from_value(serde_json::json!({
            "firstName": "  Asha ",
            "lastName": " ",
            "email": " Asha@Example.com ",
            "password": "secret1",
            "role": "EMPLOYEE"
        }))
        .unwrap();
        payload.normalize();
        assert_eq!(payload.first_name, "Asha");
        assert_eq!(payload.last_name, None);
        assert_eq!(payload.email, "asha@example.com");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn short_password_fails() {
        let payload = LoginPayload {
            email: "a@b.co".into(),
            password: "123".into(),
        };
        assert!(payload.validate().is_err());
    }
}
