pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    auth_service::AuthService, course_service::CourseService,
    dashboard_service::DashboardService, follow_up_service::FollowUpService,
    interaction_service::InteractionService, lead_service::LeadService,
    storage_service::StorageService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub lead_service: LeadService,
    pub interaction_service: InteractionService,
    pub follow_up_service: FollowUpService,
    pub dashboard_service: DashboardService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(user_service.clone());
        let course_service = CourseService::new(pool.clone());
        let lead_service = LeadService::new(pool.clone());
        let interaction_service = InteractionService::new(pool.clone());
        let follow_up_service = FollowUpService::new(pool.clone());
        let dashboard_service = DashboardService::new(pool.clone());
        let storage_service =
            StorageService::new(&config.uploads_dir, config.public_base_url.clone());

        Self {
            pool,
            auth_service,
            user_service,
            course_service,
            lead_service,
            interaction_service,
            follow_up_service,
            dashboard_service,
            storage_service,
        }
    }
}
