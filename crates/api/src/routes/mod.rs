//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod schedule_generations;
pub mod scheduler_configs;
pub mod schedules;
pub mod shift_templates;
