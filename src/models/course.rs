use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pg_enum!(CourseLevel, "course_level", "course level", {
    Diploma => "DIPLOMA",
    Bachelors => "BACHELORS",
    Masters => "MASTERS",
    Doctorate => "DOCTORATE",
});

pub const COURSE_COLUMNS: &str = "id, name, level, is_active, created_at, updated_at";

pub const COURSE_SEARCH_COLUMNS: &[&str] = &["name"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub level: CourseLevel,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
