//! Scheduler config entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the scheduler_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct SchedulerConfigEntity {
    pub id: Uuid,
    pub name: String,
    pub course_shortfall_penalty: f64,
    pub min_hours_penalty: f64,
    pub max_hours_penalty: f64,
    pub understaffed_penalty: f64,
    pub extra_hours_penalty: f64,
    pub max_extra_penalty: f64,
    pub baseline_hours_target: i32,
    pub solver_time_limit: Option<i32>,
    pub solver_gap: Option<f64>,
    pub log_solver_output: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SchedulerConfigEntity> for domain::models::SchedulerConfig {
    fn from(entity: SchedulerConfigEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            course_shortfall_penalty: entity.course_shortfall_penalty,
            min_hours_penalty: entity.min_hours_penalty,
            max_hours_penalty: entity.max_hours_penalty,
            understaffed_penalty: entity.understaffed_penalty,
            extra_hours_penalty: entity.extra_hours_penalty,
            max_extra_penalty: entity.max_extra_penalty,
            baseline_hours_target: entity.baseline_hours_target,
            solver_time_limit: entity.solver_time_limit,
            solver_gap: entity.solver_gap,
            log_solver_output: entity.log_solver_output,
            is_default: entity.is_default,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
