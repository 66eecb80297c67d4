use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

pg_enum!(Gender, "gender", "gender", {
    Male => "MALE",
    Female => "FEMALE",
});

pg_enum!(LeadStatus, "lead_status", "lead status", {
    New => "NEW",
    Contacted => "CONTACTED",
    Qualified => "QUALIFIED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Lost => "LOST",
});

pg_enum!(LeadSource, "lead_source", "lead source", {
    Website => "WEBSITE",
    Referral => "REFERRAL",
    Event => "EVENT",
    Advertisement => "ADVERTISEMENT",
    Partner => "PARTNER",
    WalkIn => "WALK_IN",
    Google => "GOOGLE",
    Facebook => "FACEBOOK",
    Instagram => "INSTAGRAM",
    Youtube => "YOUTUBE",
    Other => "OTHER",
});

pg_enum!(LeadPriority, "lead_priority", "lead priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

impl Default for LeadPriority {
    fn default() -> Self {
        LeadPriority::Medium
    }
}

pub const LEAD_COLUMNS: &str = "id, first_name, last_name, email, phone, gender, dob, course_id, \
     assigned_to, created_by, status, source, priority, is_active, profile_pic, father_name, \
     father_phone, street_address, city, state, postal_code, country, created_at, updated_at";

/// Columns matched by the free-text search on the lead listing.
pub const LEAD_SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "email", "phone"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub course_id: Option<i32>,
    pub assigned_to: i32,
    pub created_by: i32,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub priority: LeadPriority,
    pub is_active: bool,
    pub profile_pic: Option<String>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_order_matches_pipeline() {
        let names: Vec<&str> = LeadStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["NEW", "CONTACTED", "QUALIFIED", "IN_PROGRESS", "COMPLETED", "LOST"]
        );
    }

    #[test]
    fn multi_word_variants_use_underscores() {
        assert_eq!(LeadSource::from_str("walk_in").unwrap(), LeadSource::WalkIn);
        assert_eq!(
            serde_json::to_value(LeadStatus::InProgress).unwrap(),
            serde_json::json!("IN_PROGRESS")
        );
        let err = LeadPriority::from_str("urgent").unwrap_err();
        assert_eq!(err, "Invalid lead priority: URGENT");
    }
}
