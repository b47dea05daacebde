//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod auth_token;
pub mod schedule;
pub mod schedule_generation;
pub mod scheduler_config;
pub mod shift_template;
pub mod user;

pub use auth_token::{RefreshTokenEntity, SingleUseTokenEntity};
pub use schedule::ScheduleEntity;
pub use schedule_generation::ScheduleGenerationEntity;
pub use scheduler_config::SchedulerConfigEntity;
pub use shift_template::ShiftTemplateEntity;
pub use user::{StudentEntity, UserEntity};
