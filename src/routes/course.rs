use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::course_dto::{
        CourseLevelQuery, CourseListQuery, CourseListResponse, CoursePayload, CourseResponse,
    },
    error::Result,
    routes::AppJson,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/courses",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Course name fragment"),
        ("level" = Option<String>, Query, description = "Course level"),
        ("status" = Option<String>, Query, description = "ACTIVE or INACTIVE")
    ),
    responses(
        (status = 200, description = "Page of courses", body = Json<CourseListResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.course_service.list(query.into_filter()?).await?;
    Ok(Json(CourseListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/courses/levels",
    params(("level" = String, Query, description = "Course level")),
    responses(
        (status = 200, description = "Active courses of the level, by name"),
        (status = 400, description = "Missing or unknown level")
    )
)]
#[axum::debug_handler]
pub async fn list_courses_by_level(
    State(state): State<AppState>,
    Query(query): Query<CourseLevelQuery>,
) -> Result<impl IntoResponse> {
    let level = query.required_level()?;
    let courses: Vec<CourseResponse> = state
        .course_service
        .list_active_by_level(level)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(json!({
        "success": true,
        "message": "Courses fetched successfully",
        "courses": courses,
    })))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Json<CourseResponse>),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_id(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Course fetched successfully",
        "course": CourseResponse::from(course),
    })))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CoursePayload,
    responses(
        (status = 201, description = "Course created", body = Json<CourseResponse>),
        (status = 400, description = "Invalid payload or duplicate name")
    )
)]
#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CoursePayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let course = state.course_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Course created successfully",
            "course": CourseResponse::from(course),
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CoursePayload,
    responses(
        (status = 200, description = "Course updated", body = Json<CourseResponse>),
        (status = 400, description = "Invalid payload or duplicate name"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(mut payload): AppJson<CoursePayload>,
) -> Result<impl IntoResponse> {
    payload.normalize();
    payload.validate()?;
    let course = state.course_service.update(id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Course updated successfully",
        "course": CourseResponse::from(course),
    })))
}

#[utoipa::path(
    patch,
    path = "/api/courses/{id}/deactivate",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deactivated", body = Json<CourseResponse>),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.deactivate(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Course deactivated successfully",
        "course": CourseResponse::from(course),
    })))
}
