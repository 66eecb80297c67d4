use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use validator::Validate;

use crate::{
    config::get_config,
    dto::{
        auth_dto::{LoginPayload, RegisterPayload, SessionResponse},
        user_dto::UserResponse,
    },
    error::Result,
    middleware::auth::{cleared_session_cookie, session_cookie, AuthUser},
    routes::AppJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User registered", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload or user already exists"),
        (status = 403, description = "Administrator signup is closed")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let user = state.auth_service.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": UserResponse::from(user),
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session cookie issued", body = Json<SessionResponse>),
        (status = 400, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = state.auth_service.login(payload).await?;
    let config = get_config();
    let jar = jar.add(session_cookie(
        session.token,
        config.token_ttl_hours,
        config.cookie_secure,
    ));
    let body = SessionResponse {
        success: true,
        message: "Login Successful".to_string(),
        user_id: session.user.id,
        role: session.user.role,
    };
    Ok((jar, Json(body)))
}

#[utoipa::path(
    get,
    path = "/api/auth/validate-token",
    responses(
        (status = 200, description = "Session is valid"),
        (status = 401, description = "Missing, invalid or revoked session")
    )
)]
#[axum::debug_handler]
pub async fn validate_token(Extension(caller): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "userId": caller.id,
        "role": caller.role,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(cleared_session_cookie(get_config().cookie_secure));
    (
        jar,
        Json(json!({ "success": true, "message": "Logout Successful" })),
    )
}
