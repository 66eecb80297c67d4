pub mod auth_dto;
pub mod course_dto;
pub mod dashboard_dto;
pub mod follow_up_dto;
pub mod interaction_dto;
pub mod lead_dto;
pub mod pagination;
pub mod user_dto;
