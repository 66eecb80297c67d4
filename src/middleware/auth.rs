use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::utils::token::{decode_token, AUTH_COOKIE};
use crate::AppState;

/// Identity of the caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner restriction for row-level visibility: `None` for admins (all
    /// rows), the caller's own id otherwise.
    pub fn owner_scope(&self) -> Option<i32> {
        if self.is_admin() {
            None
        } else {
            Some(self.id)
        }
    }
}

fn unauthorized() -> Error {
    Error::Unauthorized("Unauthorized".to_string())
}

/// Resolves the session cookie to an active user. The role comes from the
/// user row, so deactivation and role changes apply to live sessions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(unauthorized)?;

    let config = crate::config::get_config();
    let claims = decode_token(&token, &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        unauthorized()
    })?;

    let role = state
        .user_service
        .active_role(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!(user_id = claims.sub, "session for missing or inactive user");
            unauthorized()
        })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role,
    });
    Ok(next.run(req).await)
}

/// Must be layered inside [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    match req.extensions().get::<AuthUser>() {
        None => Err(unauthorized()),
        Some(user) if !user.is_admin() => Err(Error::Forbidden(
            "You do not have permission to perform this action".to_string(),
        )),
        Some(_) => Ok(next.run(req).await),
    }
}

pub fn session_cookie(token: String, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::hours(ttl_hours))
        .build()
}

pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_are_not_owner_scoped() {
        let admin = AuthUser { id: 1, role: Role::Admin };
        let employee = AuthUser { id: 9, role: Role::Employee };
        assert_eq!(admin.owner_scope(), None);
        assert_eq!(employee.owner_scope(), Some(9));
    }

    #[test]
    fn session_cookie_is_http_only_for_a_day() {
        let cookie = session_cookie("abc".into(), 24, false);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("auth_token=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=86400"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let rendered = cleared_session_cookie(true).to_string();
        assert!(rendered.starts_with("auth_token=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("Secure"));
    }
}
