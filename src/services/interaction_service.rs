use sqlx::PgPool;

use crate::dto::interaction_dto::InteractionPayload;
use crate::error::Result;
use crate::models::interaction::{InteractionLog, InteractionWithAuthor};

#[derive(Clone)]
pub struct InteractionService {
    pool: PgPool,
}

impl InteractionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Interactions of a lead, newest first. Callers check lead visibility.
    pub async fn list_for_lead(&self, lead_id: i32) -> Result<Vec<InteractionWithAuthor>> {
        let rows = sqlx::query_as::<_, InteractionWithAuthor>(
            r#"
            SELECT i.id, i.lead_id, i.interaction_by_id, i.interaction_type, i.notes,
                   i.interaction_time,
                   u.first_name AS author_first_name, u.last_name AS author_last_name
            FROM interaction_logs i
            JOIN users u ON u.id = i.interaction_by_id
            WHERE i.lead_id = $1
            ORDER BY i.interaction_time DESC, i.id DESC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        lead_id: i32,
        author_id: i32,
        payload: InteractionPayload,
    ) -> Result<InteractionLog> {
        let log = sqlx::query_as::<_, InteractionLog>(
            r#"
            INSERT INTO interaction_logs (lead_id, interaction_by_id, interaction_type, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, lead_id, interaction_by_id, interaction_type, notes, interaction_time
            "#,
        )
        .bind(lead_id)
        .bind(author_id)
        .bind(payload.interaction_type)
        .bind(payload.notes)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(lead_id, interaction_id = log.id, "interaction logged");
        Ok(log)
    }
}
