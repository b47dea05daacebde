//! Schedule generation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::GenerationStatus;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the schedule_generations table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleGenerationEntity {
    pub id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub config_id: Uuid,
    pub status: String,
    pub request_payload: Option<String>,
    pub response_payload: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl From<ScheduleGenerationEntity> for domain::models::ScheduleGeneration {
    fn from(entity: ScheduleGenerationEntity) -> Self {
        Self {
            id: entity.id,
            schedule_id: entity.schedule_id,
            config_id: entity.config_id,
            status: GenerationStatus::from_str(&entity.status).unwrap_or(GenerationStatus::Failed),
            request_payload: entity.request_payload,
            response_payload: entity.response_payload,
            error_message: entity.error_message,
            started_at: entity.started_at,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
            created_by: entity.created_by,
        }
    }
}
