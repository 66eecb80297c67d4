use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::lead::LeadStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserConversion {
    pub assigned_to: i32,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub message: String,
    pub lead_status_counts: Vec<StatusCount>,
    pub leads_by_month: Vec<MonthCount>,
    pub user_conversions: Vec<UserConversion>,
}

/// Expands grouped counts to one entry per status, in pipeline order.
pub fn fill_status_counts(rows: &[(LeadStatus, i64)]) -> Vec<StatusCount> {
    LeadStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: rows
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}
