use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::query::{bind_query_as, SqlArg, WhereBuilder};
use crate::dto::follow_up_dto::FollowUpFilter;
use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::follow_up::{FollowUp, FollowUpDetail, FOLLOW_UP_COLUMNS};

const DETAIL_SELECT: &str = r#"
    SELECT f.id, f.lead_id, f.assigned_to_id, f.follow_up_date, f.notes, f.is_completed,
           f.created_at,
           l.first_name AS lead_first_name, l.last_name AS lead_last_name,
           l.phone AS lead_phone, l.status AS lead_status,
           u.first_name AS assignee_first_name, u.last_name AS assignee_last_name,
           u.email AS assignee_email
    FROM follow_ups f
    JOIN leads l ON l.id = f.lead_id
    JOIN users u ON u.id = f.assigned_to_id
"#;

const DETAIL_ORDER: &str = "ORDER BY f.follow_up_date ASC, f.id ASC";

#[derive(Clone)]
pub struct FollowUpService {
    pool: PgPool,
}

pub fn build_follow_up_filter(filter: &FollowUpFilter, caller: &AuthUser) -> WhereBuilder {
    let mut builder = WhereBuilder::new();
    if let Some(completed) = filter.completed {
        builder.eq("f.is_completed", SqlArg::Bool(completed));
    }
    if let Some(day) = filter.date {
        builder.on_date("(f.follow_up_date AT TIME ZONE 'UTC')", day);
    }
    if let Some(owner) = caller.owner_scope() {
        builder.eq("f.assigned_to_id", SqlArg::Int(owner));
    }
    builder
}

fn not_found() -> Error {
    Error::NotFound("Follow-up not found.".to_string())
}

impl FollowUpService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_details(&self, builder: &WhereBuilder) -> Result<Vec<FollowUpDetail>> {
        let sql = format!(
            "{} {} {}",
            DETAIL_SELECT,
            builder.where_clause(),
            DETAIL_ORDER
        );
        let rows = bind_query_as(sqlx::query_as::<_, FollowUpDetail>(&sql), builder.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list(
        &self,
        filter: FollowUpFilter,
        caller: &AuthUser,
    ) -> Result<Vec<FollowUpDetail>> {
        self.fetch_details(&build_follow_up_filter(&filter, caller))
            .await
    }

    pub async fn list_for_lead(&self, lead_id: i32) -> Result<Vec<FollowUpDetail>> {
        let mut builder = WhereBuilder::new();
        builder.eq("f.lead_id", SqlArg::Int(lead_id));
        self.fetch_details(&builder).await
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<FollowUpDetail>> {
        let mut builder = WhereBuilder::new();
        builder.eq("f.assigned_to_id", SqlArg::Int(user_id));
        self.fetch_details(&builder).await
    }

    pub async fn create(
        &self,
        lead_id: i32,
        assignee_id: i32,
        follow_up_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<FollowUp> {
        let sql = format!(
            r#"
            INSERT INTO follow_ups (lead_id, assigned_to_id, follow_up_date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        );
        let follow_up = sqlx::query_as::<_, FollowUp>(&sql)
            .bind(lead_id)
            .bind(assignee_id)
            .bind(follow_up_date)
            .bind(notes)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(lead_id, follow_up_id = follow_up.id, "follow-up scheduled");
        Ok(follow_up)
    }

    pub async fn mark_complete(&self, id: i32, caller: &AuthUser) -> Result<FollowUp> {
        let sql = format!(
            r#"
            UPDATE follow_ups SET is_completed = TRUE
            WHERE id = $1 AND ($2::int IS NULL OR assigned_to_id = $2)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        );
        sqlx::query_as::<_, FollowUp>(&sql)
            .bind(id)
            .bind(caller.owner_scope())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn update(
        &self,
        id: i32,
        follow_up_date: DateTime<Utc>,
        notes: Option<String>,
        caller: &AuthUser,
    ) -> Result<FollowUp> {
        let sql = format!(
            r#"
            UPDATE follow_ups SET follow_up_date = $3, notes = $4
            WHERE id = $1 AND ($2::int IS NULL OR assigned_to_id = $2)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        );
        sqlx::query_as::<_, FollowUp>(&sql)
            .bind(id)
            .bind(caller.owner_scope())
            .bind(follow_up_date)
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, id: i32, caller: &AuthUser) -> Result<()> {
        let res = sqlx::query(
            "DELETE FROM follow_ups WHERE id = $1 AND ($2::int IS NULL OR assigned_to_id = $2)",
        )
        .bind(id)
        .bind(caller.owner_scope())
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(not_found());
        }
        tracing::info!(follow_up_id = id, "follow-up deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use chrono::NaiveDate;

    #[test]
    fn employee_follow_ups_are_scoped_and_filtered() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let filter = FollowUpFilter {
            completed: Some(false),
            date: Some(day),
        };
        let caller = AuthUser { id: 5, role: Role::Employee };
        let builder = build_follow_up_filter(&filter, &caller);
        assert_eq!(
            builder.where_clause(),
            "WHERE f.is_completed = $1 AND (f.follow_up_date AT TIME ZONE 'UTC')::date = $2 \
             AND f.assigned_to_id = $3"
        );
        assert_eq!(
            builder.args(),
            &[SqlArg::Bool(false), SqlArg::Date(day), SqlArg::Int(5)]
        );
    }

    #[test]
    fn admin_sees_all_follow_ups() {
        let caller = AuthUser { id: 1, role: Role::Admin };
        assert!(build_follow_up_filter(&FollowUpFilter::default(), &caller).is_empty());
    }
}
