use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::{PageRequest, Paged};
use crate::dto::user_dto::parse_active_status;
use crate::error::{Error, Result};
use crate::models::course::{Course, CourseLevel};
use crate::utils::validation::{parse_filter, trim};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    #[validate(length(min = 1, message = "Course name is required"))]
    pub name: String,
    pub level: CourseLevel,
}

impl CoursePayload {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CourseListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFilter {
    pub page: PageRequest,
    pub search: String,
    pub level: Option<CourseLevel>,
    pub is_active: Option<bool>,
}

impl CourseListQuery {
    pub fn into_filter(self) -> Result<CourseFilter> {
        Ok(CourseFilter {
            page: PageRequest::from_query(self.page.as_deref(), self.limit.as_deref()),
            search: self.search.unwrap_or_default().trim().to_string(),
            level: parse_filter(self.level.as_deref())?,
            is_active: parse_active_status(self.status.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CourseLevelQuery {
    pub level: Option<String>,
}

impl CourseLevelQuery {
    pub fn required_level(&self) -> Result<CourseLevel> {
        parse_filter(self.level.as_deref())?
            .ok_or_else(|| Error::BadRequest("Course level is required".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: i32,
    pub name: String,
    pub level: CourseLevel,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(value: Course) -> Self {
        Self {
            id: value.id,
            name: value.name,
            level: value.level,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePagination {
    pub current_page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_courses: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    pub success: bool,
    pub message: String,
    pub courses: Vec<CourseResponse>,
    pub pagination: CoursePagination,
}

impl From<Paged<Course>> for CourseListResponse {
    fn from(value: Paged<Course>) -> Self {
        let pagination = CoursePagination {
            current_page: value.page.page,
            limit: value.page.limit,
            total_pages: value.total_pages(),
            total_courses: value.total,
        };
        Self {
            success: true,
            message: "Courses fetched successfully".to_string(),
            courses: value.items.into_iter().map(Into::into).collect(),
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_query_requires_a_known_level() {
        let q = CourseLevelQuery { level: Some("masters".into()) };
        assert_eq!(q.required_level().unwrap(), CourseLevel::Masters);
        assert!(CourseLevelQuery::default().required_level().is_err());
        let q = CourseLevelQuery { level: Some("PHD".into()) };
        assert!(q.required_level().is_err());
    }

    #[test]
    fn payload_uses_enum_level() {
        let parsed: std::result::Result<CoursePayload, _> =
            serde_json::from_value(serde_json::json!({ "name": "MBA", "level": "MASTERS" }));
        assert!(parsed.is_ok());
        let parsed: std::result::Result<CoursePayload, _> =
            serde_json::from_value(serde_json::json!({ "name": "MBA", "level": "PHD" }));
        assert!(parsed.is_err());
    }
}
