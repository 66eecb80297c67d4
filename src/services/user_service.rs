use sqlx::PgPool;

use crate::database::query::{fetch_page, Listing, SqlArg, WhereBuilder};
use crate::dto::pagination::Paged;
use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserFilter};
use crate::error::{Error, Result};
use crate::models::user::{Role, User, USER_COLUMNS, USER_SEARCH_COLUMNS};
use crate::utils::crypto::hash_password_blocking;

const USER_LISTING: Listing = Listing {
    columns: USER_COLUMNS,
    from: "users",
    order_by: "created_at DESC, id DESC",
};

/// Fields of a new user row; `password` is already hashed.
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub fn build_user_filter(filter: &UserFilter) -> WhereBuilder {
    let mut builder = WhereBuilder::new();
    builder.search(USER_SEARCH_COLUMNS, &filter.search);
    if let Some(role) = &filter.role {
        builder.eq_enum("role", role);
    }
    if let Some(active) = filter.is_active {
        builder.eq("is_active", SqlArg::Bool(active));
    }
    builder
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: UserFilter) -> Result<Paged<User>> {
        let builder = build_user_filter(&filter);
        fetch_page(&self.pool, USER_LISTING, &builder, filter.page).await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found.".to_string()))
    }

    /// Current role of an active user; `None` when the account is gone or
    /// deactivated.
    pub async fn active_role(&self, id: i32) -> Result<Option<Role>> {
        let role = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM users WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn has_active_admin(&self) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE role = 'ADMIN' AND is_active)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Rejects an email or phone already held by another user.
    pub async fn ensure_unique(
        &self,
        email: &str,
        phone: Option<&str>,
        exclude_id: Option<i32>,
    ) -> Result<()> {
        let clash = sqlx::query_as::<_, (String, Option<String>)>(
            r#"
            SELECT email, phone FROM users
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
            Some((existing, _)) if existing == email => Err(Error::BadRequest(
                "User with this email already exists".to_string(),
            )),
            Some(_) => Err(Error::BadRequest(
                "User with this phone number already exists".to_string(),
            )),
        }
    }

    pub async fn insert(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, password, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.phone)
            .bind(user.password)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        self.ensure_unique(&payload.email, Some(&payload.phone), None)
            .await?;
        let password = hash_password_blocking(payload.password).await?;
        let user = self
            .insert(NewUser {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                phone: Some(payload.phone),
                password,
                role: payload.role,
            })
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<User> {
        self.get_by_id(id).await?;
        self.ensure_unique(&payload.email, Some(&payload.phone), Some(id))
            .await?;

        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, phone = $5, role = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(payload.first_name)
            .bind(payload.last_name)
            .bind(payload.email)
            .bind(payload.phone)
            .bind(payload.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn deactivate(&self, id: i32) -> Result<User> {
        let sql = format!(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found.".to_string()))?;
        tracing::info!(user_id = id, "user deactivated");
        Ok(user)
    }
}
