use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pg_enum!(InteractionType, "interaction_type", "interaction type", {
    Call => "CALL",
    Email => "EMAIL",
    VideoCall => "VIDEO_CALL",
    WalkIn => "WALK_IN",
    Other => "OTHER",
});

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLog {
    pub id: i32,
    pub lead_id: i32,
    pub interaction_by_id: i32,
    pub interaction_type: InteractionType,
    pub notes: Option<String>,
    pub interaction_time: DateTime<Utc>,
}

/// Interaction joined with the first/last name of the user who logged it.
#[derive(Debug, Clone, FromRow)]
pub struct InteractionWithAuthor {
    pub id: i32,
    pub lead_id: i32,
    pub interaction_by_id: i32,
    pub interaction_type: InteractionType,
    pub notes: Option<String>,
    pub interaction_time: DateTime<Utc>,
    pub author_first_name: String,
    pub author_last_name: Option<String>,
}
