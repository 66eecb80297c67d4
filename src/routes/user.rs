use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::{
        follow_up_dto::FollowUpListResponse,
        user_dto::{
            CreateUserPayload, UpdateUserPayload, UserListQuery, UserListResponse, UserResponse,
        },
    },
    error::Result,
    routes::AppJson,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Name, email or phone fragment"),
        ("role" = Option<String>, Query, description = "ADMIN or EMPLOYEE"),
        ("status" = Option<String>, Query, description = "ACTIVE or INACTIVE")
    ),
    responses(
        (status = 200, description = "Page of users", body = Json<UserListResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.user_service.list(query.into_filter()?).await?;
    Ok(Json(UserListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = Json<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User fetched successfully",
        "user": UserResponse::from(user),
    })))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload or duplicate email/phone")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "user": UserResponse::from(user),
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload or duplicate email/phone"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully",
        "user": UserResponse::from(user),
    })))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/deactivate",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = Json<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.deactivate(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User deactivated successfully",
        "user": UserResponse::from(user),
    })))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/follow-ups",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Follow-ups assigned to the user", body = Json<FollowUpListResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn list_user_follow_ups(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.user_service.get_by_id(id).await?;
    let rows = state.follow_up_service.list_for_user(id).await?;
    Ok(Json(FollowUpListResponse::new(rows)))
}
