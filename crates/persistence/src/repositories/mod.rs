//! Repository implementations for database operations.
//!
//! Repositories are stateless. Every method takes the connection of the
//! transaction it runs in, so callers compose several calls atomically
//! inside one `TxManager` body.

pub mod refresh_token;
pub mod schedule;
pub mod schedule_generation;
pub mod scheduler_config;
pub mod shift_template;
pub mod single_use_token;
pub mod user;

pub use refresh_token::RefreshTokenRepository;
pub use schedule::ScheduleRepository;
pub use schedule_generation::ScheduleGenerationRepository;
pub use scheduler_config::SchedulerConfigRepository;
pub use shift_template::ShiftTemplateRepository;
pub use single_use_token::SingleUseTokenRepository;
pub use user::UserRepository;

/// PostgreSQL error code for unique_violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Returns whether `err` is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
