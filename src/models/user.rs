use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pg_enum!(Role, "user_role", "role", {
    Admin => "ADMIN",
    Employee => "EMPLOYEE",
});

pub const USER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, password, role, is_active, created_at, updated_at";

pub const USER_SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "email", "phone"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::Employee.to_string(), "EMPLOYEE");
        assert_eq!(
            serde_json::to_value(Role::Admin).unwrap(),
            serde_json::json!("ADMIN")
        );
        assert!(Role::from_str("root").is_err());
    }
}
