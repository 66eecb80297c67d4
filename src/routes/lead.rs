use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::{
        follow_up_dto::{FollowUpListResponse, FollowUpPayload, FollowUpResponse},
        interaction_dto::{
            InteractionCreatedResponse, InteractionListResponse, InteractionPayload,
            InteractionResponse,
        },
        lead_dto::{
            AssignLeadPayload, LeadListQuery, LeadListResponse, LeadPayload, LeadStatusPayload,
        },
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::lead::Lead,
    routes::AppJson,
    AppState,
};

const PROFILE_IMAGE_FIELD: &str = "imageFile";

fn lead_body(message: &str, lead: Lead) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": message,
        "lead": lead,
    }))
}

#[utoipa::path(
    get,
    path = "/api/leads",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 10, max 100"),
        ("search" = Option<String>, Query, description = "Name, email or phone fragment"),
        ("status" = Option<String>, Query, description = "Lead status"),
        ("source" = Option<String>, Query, description = "Lead source"),
        ("priority" = Option<String>, Query, description = "Lead priority")
    ),
    responses(
        (status = 200, description = "Page of visible leads", body = Json<LeadListResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<LeadListQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.into_filter()?;
    let page = state.lead_service.list(filter, &caller).await?;
    Ok(Json(LeadListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead found"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn get_lead(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let lead = state.lead_service.get(id, &caller).await?;
    Ok(lead_body("Lead fetched successfully", lead))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = LeadPayload,
    responses(
        (status = 201, description = "Lead created and assigned to the caller"),
        (status = 400, description = "Invalid payload, duplicate contact or unknown course")
    )
)]
#[axum::debug_handler]
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    AppJson(mut payload): AppJson<LeadPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let lead = state.lead_service.create(payload, &caller).await?;
    Ok((
        StatusCode::CREATED,
        lead_body("Lead created successfully", lead),
    ))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = LeadPayload,
    responses(
        (status = 200, description = "Lead updated"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<LeadPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let lead = state.lead_service.update(id, payload, &caller).await?;
    Ok(lead_body("Lead updated successfully", lead))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}/deactivate",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead deactivated"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_lead(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let lead = state.lead_service.deactivate(id, &caller).await?;
    Ok(lead_body("Lead deactivated successfully", lead))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = LeadStatusPayload,
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn update_lead_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<LeadStatusPayload>,
) -> Result<impl IntoResponse> {
    let lead = state
        .lead_service
        .update_status(id, payload.status, &caller)
        .await?;
    Ok(lead_body("Lead status updated successfully", lead))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}/assigned",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = AssignLeadPayload,
    responses(
        (status = 200, description = "Lead reassigned"),
        (status = 400, description = "Target user missing or inactive"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Lead not found")
    )
)]
#[axum::debug_handler]
pub async fn assign_lead(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignLeadPayload>,
) -> Result<impl IntoResponse> {
    let lead = state.lead_service.assign(id, payload.assigned_to).await?;
    Ok(lead_body("Lead assigned successfully", lead))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}/upload-profile-image",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Profile image stored"),
        (status = 400, description = "Missing or unsupported image"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let previous = state.lead_service.get(id, &caller).await?.profile_pic;

    let mut url = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PROFILE_IMAGE_FIELD) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            url = Some(
                state
                    .storage_service
                    .save_profile_image(&filename, &data)
                    .await?,
            );
            break;
        }
    }

    let url = url.ok_or_else(|| Error::BadRequest("No image file provided".into()))?;
    let lead = match state
        .lead_service
        .set_profile_pic(id, url.clone(), &caller)
        .await
    {
        Ok(lead) => lead,
        Err(e) => {
            state.storage_service.remove_profile_image(&url).await;
            return Err(e);
        }
    };
    if let Some(previous) = previous.filter(|p| *p != url) {
        state.storage_service.remove_profile_image(&previous).await;
    }
    tracing::info!(lead_id = id, "profile image updated");
    Ok(lead_body("Profile image uploaded successfully", lead))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}/interactions",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Interactions, newest first", body = Json<InteractionListResponse>),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn list_interactions(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.lead_service.get(id, &caller).await?;
    let rows = state.interaction_service.list_for_lead(id).await?;
    Ok(Json(InteractionListResponse {
        success: true,
        message: "Interactions fetched successfully".to_string(),
        interactions: rows.into_iter().map(InteractionResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/leads/{id}/interactions",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = InteractionPayload,
    responses(
        (status = 201, description = "Interaction logged", body = Json<InteractionCreatedResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn create_interaction(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<InteractionPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    state.lead_service.get(id, &caller).await?;
    let interaction = state
        .interaction_service
        .create(id, caller.id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InteractionCreatedResponse {
            success: true,
            message: "Interaction logged successfully".to_string(),
            interaction,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}/follow-ups",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Follow-ups of the lead", body = Json<FollowUpListResponse>),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn list_lead_follow_ups(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.lead_service.get(id, &caller).await?;
    let rows = state.follow_up_service.list_for_lead(id).await?;
    Ok(Json(FollowUpListResponse::new(rows)))
}

#[utoipa::path(
    post,
    path = "/api/leads/{id}/follow-ups",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = FollowUpPayload,
    responses(
        (status = 201, description = "Follow-up scheduled", body = Json<FollowUpResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Lead not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn create_lead_follow_up(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<FollowUpPayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let scheduled_at = payload.scheduled_at()?;
    state.lead_service.get(id, &caller).await?;
    let follow_up = state
        .follow_up_service
        .create(id, caller.id, scheduled_at, payload.notes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FollowUpResponse {
            success: true,
            message: "Follow-up created successfully".to_string(),
            follow_up,
        }),
    ))
}
