use axum::{
    extract::{DefaultBodyLimit, FromRequest},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::get_config,
    error::{Error, Result},
    middleware::{
        auth::{require_admin, require_auth},
        cors::cors_layer,
        rate_limit::{rps_middleware, RateLimiter},
    },
    AppState,
};

pub mod auth;
pub mod course;
pub mod dashboard;
pub mod follow_up;
pub mod health;
pub mod lead;
pub mod user;

pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// `axum::Json` whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

pub fn router(state: AppState) -> Result<Router> {
    let config = get_config();

    let public_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    let session_api = Router::new()
        .route("/api/auth/validate-token", get(auth::validate_token))
        .route("/api/courses/levels", get(course::list_courses_by_level))
        .route("/api/leads", get(lead::list_leads).post(lead::create_lead))
        .route(
            "/api/leads/:id",
            get(lead::get_lead).put(lead::update_lead),
        )
        .route("/api/leads/:id/deactivate", patch(lead::deactivate_lead))
        .route("/api/leads/:id/status", patch(lead::update_lead_status))
        .route(
            "/api/leads/:id/upload-profile-image",
            patch(lead::upload_profile_image),
        )
        .route(
            "/api/leads/:id/interactions",
            get(lead::list_interactions).post(lead::create_interaction),
        )
        .route(
            "/api/leads/:id/follow-ups",
            get(lead::list_lead_follow_ups).post(lead::create_lead_follow_up),
        )
        .route("/api/follow-ups", get(follow_up::list_follow_ups))
        .route(
            "/api/follow-ups/:id",
            put(follow_up::update_follow_up)
                .delete(follow_up::delete_follow_up),
        )
        .route(
            "/api/follow-ups/:id/mark-complete",
            patch(follow_up::mark_follow_up_complete),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin_api = Router::new()
        .route("/api/users", get(user::list_users).post(user::create_user))
        .route("/api/users/:id", get(user::get_user).put(user::update_user))
        .route("/api/users/:id/deactivate", patch(user::deactivate_user))
        .route("/api/users/:id/follow-ups", get(user::list_user_follow_ups))
        .route(
            "/api/courses",
            get(course::list_courses).post(course::create_course),
        )
        .route(
            "/api/courses/:id",
            get(course::get_course).put(course::update_course),
        )
        .route(
            "/api/courses/:id/deactivate",
            patch(course::deactivate_course),
        )
        .route("/api/leads/:id/assigned", patch(lead::assign_lead))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = public_api
        .merge(session_api)
        .merge(admin_api)
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps),
            rps_middleware,
        ));

    tracing::info!("Serving uploads from: {}", config.uploads_dir);

    let app = Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config.frontend_url.as_deref())?)
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        );

    Ok(app)
}
