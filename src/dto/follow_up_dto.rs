use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::follow_up::{FollowUp, FollowUpDetail};
use crate::models::lead::LeadStatus;
use crate::utils::time::{parse_date, parse_datetime};
use crate::utils::validation::{trim, trim_opt};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpPayload {
    #[validate(custom(function = "crate::utils::validation::validate_datetime"))]
    pub follow_up_date: String,
    pub notes: Option<String>,
}

impl FollowUpPayload {
    pub fn normalize(&mut self) {
        trim(&mut self.follow_up_date);
        trim_opt(&mut self.notes);
    }

    pub fn scheduled_at(&self) -> Result<DateTime<Utc>> {
        parse_datetime(&self.follow_up_date).ok_or_else(|| {
            Error::BadRequest("Follow-up date must be a valid date string.".to_string())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FollowUpListQuery {
    pub completed: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowUpFilter {
    pub completed: Option<bool>,
    pub date: Option<NaiveDate>,
}

impl FollowUpListQuery {
    pub fn into_filter(self) -> Result<FollowUpFilter> {
        let completed = match self.completed.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case("true") => Some(true),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Some(false),
            Some(raw) => {
                return Err(Error::BadRequest(format!(
                    "Invalid completed flag: {}",
                    raw
                )))
            }
        };
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_date(raw)
                    .ok_or_else(|| Error::BadRequest(format!("Invalid date: {}", raw)))?,
            ),
        };
        Ok(FollowUpFilter { completed, date })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpLeadSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: String,
    pub status: LeadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpAssignee {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpDetailResponse {
    pub id: i32,
    pub follow_up_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub lead: FollowUpLeadSummary,
    pub assigned_to: FollowUpAssignee,
}

impl From<FollowUpDetail> for FollowUpDetailResponse {
    fn from(value: FollowUpDetail) -> Self {
        Self {
            id: value.id,
            follow_up_date: value.follow_up_date,
            notes: value.notes,
            is_completed: value.is_completed,
            created_at: value.created_at,
            lead: FollowUpLeadSummary {
                id: value.lead_id,
                first_name: value.lead_first_name,
                last_name: value.lead_last_name,
                phone: value.lead_phone,
                status: value.lead_status,
            },
            assigned_to: FollowUpAssignee {
                id: value.assigned_to_id,
                first_name: value.assignee_first_name,
                last_name: value.assignee_last_name,
                email: value.assignee_email,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpListResponse {
    pub success: bool,
    pub message: String,
    pub follow_ups: Vec<FollowUpDetailResponse>,
}

impl FollowUpListResponse {
    pub fn new(rows: Vec<FollowUpDetail>) -> Self {
        Self {
            success: true,
            message: "Follow-ups fetched successfully".to_string(),
            follow_ups: rows.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResponse {
    pub success: bool,
    pub message: String,
    pub follow_up: FollowUp,
}
