use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::user_service::{NewUser, UserService};
use crate::utils::crypto::{hash_password_blocking, verify_password_blocking};
use crate::utils::token::issue_session_token;

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
}

/// A verified login: the user and the session token to hand out as a cookie.
pub struct Session {
    pub user: User,
    pub token: String,
}

fn invalid_credentials() -> Error {
    Error::BadRequest("Invalid Credentials".to_string())
}

impl AuthService {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }

    /// Self-service signup. An ADMIN account can only be claimed while the
    /// system has no active administrator.
    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        if self.users.find_by_email(&payload.email).await?.is_some() {
            return Err(Error::BadRequest("User already exists".to_string()));
        }
        if payload.role == Role::Admin && self.users.has_active_admin().await? {
            return Err(Error::Forbidden(
                "Only an administrator can create administrator accounts".to_string(),
            ));
        }

        let password = hash_password_blocking(payload.password).await?;
        let user = self
            .users
            .insert(NewUser {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                phone: None,
                password,
                role: payload.role,
            })
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<Session> {
        let email = payload.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password_blocking(payload.password, user.password.clone()).await? {
            tracing::debug!(user_id = user.id, "password mismatch");
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(Error::Forbidden("Your account has been deactivated".to_string()));
        }

        let token = issue_session_token(user.id, user.role)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(Session { user, token })
    }
}
