use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::dto::pagination::{PageRequest, Paged};
use crate::error::Result;
use crate::models::lead::{Gender, Lead, LeadPriority, LeadSource, LeadStatus};
use crate::utils::validation::{parse_filter, trim, trim_opt};

/// Body of lead create (`POST /api/leads`) and full update
/// (`PUT /api/leads/:id`). `status` is ignored on create.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "crate::utils::validation::validate_phone"))]
    pub phone: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub course_id: Option<i32>,
    #[validate(custom(function = "crate::utils::validation::validate_date"))]
    pub dob: String,
    pub source: LeadSource,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub priority: Option<LeadPriority>,
    pub status: Option<LeadStatus>,
}

impl LeadPayload {
    pub fn normalize(&mut self) {
        trim(&mut self.first_name);
        trim_opt(&mut self.last_name);
        trim_opt(&mut self.email);
        if let Some(email) = self.email.as_mut() {
            *email = email.to_lowercase();
        }
        trim(&mut self.phone);
        trim(&mut self.dob);
        for field in [
            &mut self.father_name,
            &mut self.father_phone,
            &mut self.street_address,
            &mut self.city,
            &mut self.state,
            &mut self.postal_code,
            &mut self.country,
        ] {
            trim_opt(field);
        }
    }
}

/// Accepts `12`, `"12"`, `""` or `null` (clients post form values as strings).
fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i32),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Int(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid courseId: {}", text))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatusPayload {
    pub status: LeadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadPayload {
    pub assigned_to: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LeadListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub priority: Option<String>,
}

/// Parsed lead listing request. Role scoping is applied separately from the
/// caller's identity, never from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub page: PageRequest,
    pub search: String,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub priority: Option<LeadPriority>,
}

impl LeadListQuery {
    pub fn into_filter(self) -> Result<LeadFilter> {
        Ok(LeadFilter {
            page: PageRequest::from_query(self.page.as_deref(), self.limit.as_deref()),
            search: self.search.unwrap_or_default().trim().to_string(),
            status: parse_filter(self.status.as_deref())?,
            source: parse_filter(self.source.as_deref())?,
            priority: parse_filter(self.priority.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPagination {
    pub current_page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_leads: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListResponse {
    pub success: bool,
    pub message: String,
    pub leads: Vec<Lead>,
    pub pagination: LeadPagination,
}

impl From<Paged<Lead>> for LeadListResponse {
    fn from(value: Paged<Lead>) -> Self {
        let pagination = LeadPagination {
            current_page: value.page.page,
            limit: value.page.limit,
            total_pages: value.total_pages(),
            total_leads: value.total,
        };
        Self {
            success: true,
            message: "Leads fetched successfully".to_string(),
            leads: value.items,
            pagination,
        }
    }
}
