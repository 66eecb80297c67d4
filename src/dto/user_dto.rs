use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::{PageRequest, Paged};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::utils::validation::{parse_filter, trim, trim_opt};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
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
    #[validate(custom(function = "crate::utils::validation::validate_phone"))]
    pub phone: String,
    pub role: Role,
}

impl CreateUserPayload {
    pub fn normalize(&mut self) {
        trim(&mut self.first_name);
        trim_opt(&mut self.last_name);
        trim(&mut self.email);
        self.email = self.email.to_lowercase();
        trim(&mut self.phone);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "crate::utils::validation::validate_phone"))]
    pub phone: String,
    pub role: Role,
}

impl UpdateUserPayload {
    pub fn normalize(&mut self) {
        trim(&mut self.first_name);
        trim_opt(&mut self.last_name);
        trim(&mut self.email);
        self.email = self.email.to_lowercase();
        trim(&mut self.phone);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl UserListQuery {
    pub fn into_filter(self) -> Result<UserFilter> {
        Ok(UserFilter {
            page: PageRequest::from_query(self.page.as_deref(), self.limit.as_deref()),
            search: self.search.unwrap_or_default().trim().to_string(),
            role: parse_filter(self.role.as_deref())?,
            is_active: parse_active_status(self.status.as_deref())?,
        })
    }
}

/// `ACTIVE` / `INACTIVE` status filter shared by the user and course listings.
pub fn parse_active_status(raw: Option<&str>) -> Result<Option<bool>> {
    match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("ACTIVE") => Ok(Some(true)),
        Some("INACTIVE") => Ok(Some(false)),
        Some(other) => Err(Error::BadRequest(format!("Invalid status: {}", other))),
    }
}

/// Parsed and validated [`UserListQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub page: PageRequest,
    pub search: String,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            role: value.role,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPagination {
    pub current_page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_users: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub success: bool,
    pub message: String,
    pub users: Vec<UserResponse>,
    pub pagination: UserPagination,
}

impl From<Paged<User>> for UserListResponse {
    fn from(value: Paged<User>) -> Self {
        let pagination = UserPagination {
            current_page: value.page.page,
            limit: value.page.limit,
            total_pages: value.total_pages(),
            total_users: value.total,
        };
        Self {
            success: true,
            message: "Users fetched successfully".to_string(),
            users: value.items.into_iter().map(Into::into).collect(),
            pagination,
        }
    }
}
