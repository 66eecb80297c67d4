use sqlx::PgPool;

use crate::dto::dashboard_dto::{fill_status_counts, DashboardResponse, MonthCount, UserConversion};
use crate::error::Result;
use crate::models::lead::LeadStatus;

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self) -> Result<DashboardResponse> {
        let statuses = sqlx::query_as::<_, (LeadStatus, i64)>(
            "SELECT status, COUNT(*) FROM leads GROUP BY status",
        )
        .fetch_all(&self.pool);

        let months = sqlx::query_as::<_, MonthCount>(
            r#"
            SELECT EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int AS year,
                   EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int AS month,
                   COUNT(*) AS count
            FROM leads
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool);

        let conversions = sqlx::query_as::<_, UserConversion>(
            r#"
            SELECT l.assigned_to,
                   CONCAT_WS(' ', u.first_name, u.last_name) AS name,
                   COUNT(*) AS count
            FROM leads l
            JOIN users u ON u.id = l.assigned_to
            WHERE l.status = 'COMPLETED'
            GROUP BY l.assigned_to, u.first_name, u.last_name
            ORDER BY count DESC, l.assigned_to ASC
            "#,
        )
        .fetch_all(&self.pool);

        let (statuses, months, conversions) = tokio::try_join!(statuses, months, conversions)?;

        Ok(DashboardResponse {
            success: true,
            message: "Dashboard data fetched successfully".to_string(),
            lead_status_counts: fill_status_counts(&statuses),
            leads_by_month: months,
            user_conversions: conversions,
        })
    }
}
