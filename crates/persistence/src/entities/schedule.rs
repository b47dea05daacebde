//! Schedule entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the schedules table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleEntity {
    pub id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub assignments: serde_json::Value,
    pub availability_metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub generation_id: Option<Uuid>,
    pub scheduler_metadata: Option<serde_json::Value>,
}

impl From<ScheduleEntity> for domain::models::Schedule {
    fn from(entity: ScheduleEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            is_active: entity.is_active,
            assignments: entity.assignments,
            availability_metadata: entity.availability_metadata,
            created_at: entity.created_at,
            created_by: entity.created_by,
            updated_at: entity.updated_at,
            archived_at: entity.archived_at,
            effective_from: entity.effective_from,
            effective_to: entity.effective_to,
            generation_id: entity.generation_id,
            scheduler_metadata: entity.scheduler_metadata,
        }
    }
}
