pub mod auth_dto;
pub mod job_dto;
pub mod post_dto;
pub mod social_dto;
