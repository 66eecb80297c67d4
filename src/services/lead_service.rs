//! Lead persistence and the role-scoped listing pipeline.
//!
//! Every read and write goes through the caller's [`AuthUser::owner_scope`]:
//! an employee only ever sees leads assigned to them, and addressing any
//! other lead is reported as "not found".

use sqlx::PgPool;

use crate::database::query::{fetch_page, Listing, SqlArg, WhereBuilder};
use crate::dto::lead_dto::{LeadFilter, LeadPayload};
use crate::dto::pagination::Paged;
use crate::error::{Error, Result};
use crate::middleware::auth::AuthUser;
use crate::models::lead::{Lead, LeadStatus, LEAD_COLUMNS, LEAD_SEARCH_COLUMNS};
use crate::utils::time::parse_date;

const LEAD_PHONE_UNIQUE: &str = "leads_phone_key";
const LEAD_EMAIL_UNIQUE: &str = "leads_email_key";

const LEAD_LISTING: Listing = Listing {
    columns: LEAD_COLUMNS,
    from: "leads",
    order_by: "created_at DESC, id DESC",
};

#[derive(Clone)]
pub struct LeadService {
    pool: PgPool,
}

/// WHERE clause for the lead listing: free-text search, the enum filters
/// and, for non-admins, the assignee restriction, all AND-combined.
pub fn build_lead_filter(filter: &LeadFilter, caller: &AuthUser) -> WhereBuilder {
    let mut builder = WhereBuilder::new();
    builder.search(LEAD_SEARCH_COLUMNS, &filter.search);
    if let Some(status) = &filter.status {
        builder.eq_enum("status", status);
    }
    if let Some(source) = &filter.source {
        builder.eq_enum("source", source);
    }
    if let Some(priority) = &filter.priority {
        builder.eq_enum("priority", priority);
    }
    if let Some(owner) = caller.owner_scope() {
        builder.eq("assigned_to", SqlArg::Int(owner));
    }
    builder
}

fn not_found() -> Error {
    Error::NotFound("Lead not found.".to_string())
}

fn contact_conflict_message(constraint: &str) -> Option<&'static str> {
    match constraint {
        LEAD_EMAIL_UNIQUE => Some("Lead with this email already exists"),
        LEAD_PHONE_UNIQUE => Some("Lead with this phone number already exists"),
        _ => None,
    }
}

/// Writes that lose a race past [`LeadService::ensure_unique_contact`]
/// still hit the unique constraints; report them the same way.
fn contact_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(message) = db_err.constraint().and_then(contact_conflict_message) {
            return Error::BadRequest(message.to_string());
        }
    }
    Error::from(err)
}

impl LeadService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: LeadFilter, caller: &AuthUser) -> Result<Paged<Lead>> {
        let builder = build_lead_filter(&filter, caller);
        let page = fetch_page(&self.pool, LEAD_LISTING, &builder, filter.page).await?;
        tracing::debug!(
            caller = caller.id,
            total = page.total,
            returned = page.items.len(),
            "leads listed"
        );
        Ok(page)
    }

    pub async fn get(&self, id: i32, caller: &AuthUser) -> Result<Lead> {
        let sql = format!(
            "SELECT {} FROM leads WHERE id = $1 AND ($2::int IS NULL OR assigned_to = $2)",
            LEAD_COLUMNS
        );
        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(caller.owner_scope())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)
    }

    async fn ensure_unique_contact(
        &self,
        email: Option<&str>,
        phone: &str,
        exclude_id: Option<i32>,
    ) -> Result<()> {
        let clash = sqlx::query_as::<_, (Option<String>, String)>(
            r#"
            SELECT email, phone FROM leads
            WHERE (email = $1 OR phone = $2)
              AND ($3::int IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(phone)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        match clash {
            None => Ok(()),
            Some((existing, _)) if existing.is_some() && existing.as_deref() == email => Err(
                Error::BadRequest("Lead with this email already exists".to_string()),
            ),
            Some(_) => Err(Error::BadRequest(
                "Lead with this phone number already exists".to_string(),
            )),
        }
    }

    async fn ensure_course(&self, course_id: Option<i32>) -> Result<()> {
        let Some(course_id) = course_id else {
            return Ok(());
        };
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(Error::BadRequest(format!(
                "Course {} does not exist",
                course_id
            )));
        }
        Ok(())
    }

    /// The creator becomes both `created_by` and the initial assignee.
    pub async fn create(&self, payload: LeadPayload, caller: &AuthUser) -> Result<Lead> {
        let dob = parse_date(&payload.dob)
            .ok_or_else(|| Error::BadRequest("Date must be a valid date string.".to_string()))?;
        self.ensure_unique_contact(payload.email.as_deref(), &payload.phone, None)
            .await?;
        self.ensure_course(payload.course_id).await?;

        let sql = format!(
            r#"
            INSERT INTO leads (
                first_name, last_name, email, phone, gender, dob, course_id,
                assigned_to, created_by, status, source, priority,
                father_name, father_phone, street_address, city, state, postal_code, country
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18
            )
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(payload.first_name)
            .bind(payload.last_name)
            .bind(payload.email)
            .bind(payload.phone)
            .bind(payload.gender)
            .bind(dob)
            .bind(payload.course_id)
            .bind(caller.id)
            .bind(LeadStatus::New)
            .bind(payload.source)
            .bind(payload.priority.unwrap_or_default())
            .bind(payload.father_name)
            .bind(payload.father_phone)
            .bind(payload.street_address)
            .bind(payload.city)
            .bind(payload.state)
            .bind(payload.postal_code)
            .bind(payload.country)
            .fetch_one(&self.pool)
            .await
            .map_err(contact_error)?;

        tracing::info!(lead_id = lead.id, created_by = caller.id, "lead created");
        Ok(lead)
    }

    /// Full replacement of the editable fields. Omitted `status` and
    /// `priority` keep their current values.
    pub async fn update(&self, id: i32, payload: LeadPayload, caller: &AuthUser) -> Result<Lead> {
        self.get(id, caller).await?;
        let dob = parse_date(&payload.dob)
            .ok_or_else(|| Error::BadRequest("Date must be a valid date string.".to_string()))?;
        self.ensure_unique_contact(payload.email.as_deref(), &payload.phone, Some(id))
            .await?;
        self.ensure_course(payload.course_id).await?;

        let sql = format!(
            r#"
            UPDATE leads
            SET first_name = $2, last_name = $3, email = $4, phone = $5, gender = $6,
                dob = $7, course_id = $8, source = $9,
                priority = COALESCE($10, priority), status = COALESCE($11, status),
                father_name = $12, father_phone = $13, street_address = $14, city = $15,
                state = $16, postal_code = $17, country = $18, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(payload.first_name)
            .bind(payload.last_name)
            .bind(payload.email)
            .bind(payload.phone)
            .bind(payload.gender)
            .bind(dob)
            .bind(payload.course_id)
            .bind(payload.source)
            .bind(payload.priority)
            .bind(payload.status)
            .bind(payload.father_name)
            .bind(payload.father_phone)
            .bind(payload.street_address)
            .bind(payload.city)
            .bind(payload.state)
            .bind(payload.postal_code)
            .bind(payload.country)
            .fetch_one(&self.pool)
            .await
            .map_err(contact_error)?;
        Ok(lead)
    }

    pub async fn deactivate(&self, id: i32, caller: &AuthUser) -> Result<Lead> {
        let lead = self
            .set_column(id, caller, "is_active = FALSE", None)
            .await?;
        tracing::info!(lead_id = id, caller = caller.id, "lead deactivated");
        Ok(lead)
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: LeadStatus,
        caller: &AuthUser,
    ) -> Result<Lead> {
        self.set_column(
            id,
            caller,
            "status = $3::lead_status",
            Some(status.as_str().to_string()),
        )
        .await
    }

    pub async fn set_profile_pic(&self, id: i32, url: String, caller: &AuthUser) -> Result<Lead> {
        self.set_column(id, caller, "profile_pic = $3", Some(url))
            .await
    }

    /// Single-column update under the caller's scope. `assignment` is a
    /// fixed SQL fragment that may reference `$3`.
    async fn set_column(
        &self,
        id: i32,
        caller: &AuthUser,
        assignment: &'static str,
        value: Option<String>,
    ) -> Result<Lead> {
        let sql = format!(
            r#"
            UPDATE leads SET {}, updated_at = NOW()
            WHERE id = $1 AND ($2::int IS NULL OR assigned_to = $2)
            RETURNING {}
            "#,
            assignment, LEAD_COLUMNS
        );
        let mut query = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(caller.owner_scope());
        if let Some(value) = value {
            query = query.bind(value);
        }
        query.fetch_optional(&self.pool).await?.ok_or_else(not_found)
    }

    /// Admin-only reassignment; the new owner must be an active user.
    pub async fn assign(&self, id: i32, assigned_to: i32) -> Result<Lead> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND is_active)",
        )
        .bind(assigned_to)
        .fetch_one(&self.pool)
        .await?;
        if !active {
            return Err(Error::BadRequest(
                "Assigned user does not exist or is inactive".to_string(),
            ));
        }

        let sql = format!(
            "UPDATE leads SET assigned_to = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            LEAD_COLUMNS
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(assigned_to)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!(lead_id = id, assigned_to, "lead reassigned");
        Ok(lead)
    }
}
