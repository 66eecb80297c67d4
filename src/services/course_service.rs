use sqlx::PgPool;

use crate::database::query::{fetch_page, Listing, SqlArg, WhereBuilder};
use crate::dto::course_dto::{CourseFilter, CoursePayload};
use crate::dto::pagination::Paged;
use crate::error::{Error, Result};
use crate::models::course::{Course, CourseLevel, COURSE_COLUMNS, COURSE_SEARCH_COLUMNS};

const COURSE_LISTING: Listing = Listing {
    columns: COURSE_COLUMNS,
    from: "courses",
    order_by: "created_at DESC, id DESC",
};

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

pub fn build_course_filter(filter: &CourseFilter) -> WhereBuilder {
    let mut builder = WhereBuilder::new();
    builder.search(COURSE_SEARCH_COLUMNS, &filter.search);
    if let Some(level) = &filter.level {
        builder.eq_enum("level", level);
    }
    if let Some(active) = filter.is_active {
        builder.eq("is_active", SqlArg::Bool(active));
    }
    builder
}

fn not_found() -> Error {
    Error::NotFound("Course not found.".to_string())
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: CourseFilter) -> Result<Paged<Course>> {
        let builder = build_course_filter(&filter);
        fetch_page(&self.pool, COURSE_LISTING, &builder, filter.page).await
    }

    pub async fn list_active_by_level(&self, level: CourseLevel) -> Result<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses WHERE level = $1 AND is_active ORDER BY name",
            COURSE_COLUMNS
        );
        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(level)
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Course> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)
    }

    async fn ensure_unique_name(&self, name: &str, exclude_id: Option<i32>) -> Result<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM courses
                WHERE LOWER(name) = LOWER($1) AND ($2::int IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        if taken {
            return Err(Error::BadRequest(
                "Course with this name already exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, payload: CoursePayload) -> Result<Course> {
        self.ensure_unique_name(&payload.name, None).await?;
        let sql = format!(
            "INSERT INTO courses (name, level) VALUES ($1, $2) RETURNING {}",
            COURSE_COLUMNS
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(payload.name)
            .bind(payload.level)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(course_id = course.id, "course created");
        Ok(course)
    }

    pub async fn update(&self, id: i32, payload: CoursePayload) -> Result<Course> {
        self.get_by_id(id).await?;
        self.ensure_unique_name(&payload.name, Some(id)).await?;
        let sql = format!(
            r#"
            UPDATE courses SET name = $2, level = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COURSE_COLUMNS
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(payload.name)
            .bind(payload.level)
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn deactivate(&self, id: i32) -> Result<Course> {
        let sql = format!(
            "UPDATE courses SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!(course_id = id, "course deactivated");
        Ok(course)
    }
}
