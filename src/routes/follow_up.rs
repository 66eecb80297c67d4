use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::follow_up_dto::{
        FollowUpListQuery, FollowUpListResponse, FollowUpPayload, FollowUpResponse,
    },
    error::Result,
    middleware::auth::AuthUser,
    routes::AppJson,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/follow-ups",
    params(
        ("completed" = Option<bool>, Query, description = "Completion flag"),
        ("date" = Option<String>, Query, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Visible follow-ups", body = Json<FollowUpListResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_follow_ups(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<FollowUpListQuery>,
) -> Result<impl IntoResponse> {
    let rows = state
        .follow_up_service
        .list(query.into_filter()?, &caller)
        .await?;
    Ok(Json(FollowUpListResponse::new(rows)))
}

#[utoipa::path(
    patch,
    path = "/api/follow-ups/{id}/mark-complete",
    params(("id" = i32, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up completed", body = Json<FollowUpResponse>),
        (status = 404, description = "Follow-up not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn mark_follow_up_complete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let follow_up = state.follow_up_service.mark_complete(id, &caller).await?;
    Ok(Json(FollowUpResponse {
        success: true,
        message: "Follow-up marked as complete".to_string(),
        follow_up,
    }))
}

#[utoipa::path(
    put,
    path = "/api/follow-ups/{id}",
    params(("id" = i32, Path, description = "Follow-up ID")),
    request_body = FollowUpPayload,
    responses(
        (status = 200, description = "Follow-up rescheduled", body = Json<FollowUpResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Follow-up not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn update_follow_up(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<FollowUpPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let scheduled_at = payload.scheduled_at()?;
    let follow_up = state
        .follow_up_service
        .update(id, scheduled_at, payload.notes, &caller)
        .await?;
    Ok(Json(FollowUpResponse {
        success: true,
        message: "Follow-up updated successfully".to_string(),
        follow_up,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/follow-ups/{id}",
    params(("id" = i32, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up deleted"),
        (status = 404, description = "Follow-up not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn delete_follow_up(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.follow_up_service.delete(id, &caller).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Follow-up deleted successfully",
    })))
}
