use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const FOLLOW_UP_COLUMNS: &str =
    "id, lead_id, assigned_to_id, follow_up_date, notes, is_completed, created_at";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: i32,
    pub lead_id: i32,
    pub assigned_to_id: i32,
    pub follow_up_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Follow-up joined with short summaries of its lead and assignee.
#[derive(Debug, Clone, FromRow)]
pub struct FollowUpDetail {
    pub id: i32,
    pub lead_id: i32,
    pub assigned_to_id: i32,
    pub follow_up_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub lead_first_name: String,
    pub lead_last_name: Option<String>,
    pub lead_phone: String,
    pub lead_status: crate::models::lead::LeadStatus,
    pub assignee_first_name: String,
    pub assignee_last_name: Option<String>,
    pub assignee_email: String,
}
