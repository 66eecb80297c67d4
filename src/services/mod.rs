pub mod auth_service;
pub mod course_service;
pub mod dashboard_service;
pub mod follow_up_service;
pub mod interaction_service;
pub mod lead_service;
pub mod storage_service;
pub mod user_service;
