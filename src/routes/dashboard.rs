use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::dashboard_dto::DashboardResponse, error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Lead statistics", body = Json<DashboardResponse>)
    )
)]
#[axum::debug_handler]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.summary().await?;
    Ok(Json(summary))
}
