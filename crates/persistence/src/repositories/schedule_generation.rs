//! Schedule generation repository for database operations.

use domain::models::ScheduleGeneration;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::ScheduleGenerationEntity;
use crate::metrics::QueryTimer;

const GENERATION_COLUMNS: &str = "id, schedule_id, config_id, status, request_payload, \
     response_payload, error_message, started_at, completed_at, created_at, created_by";

pub struct ScheduleGenerationRepository;

impl ScheduleGenerationRepository {
    pub async fn create(
        conn: &mut PgConnection,
        generation: &ScheduleGeneration,
    ) -> Result<ScheduleGenerationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_schedule_generation");
        let result = sqlx::query_as::<_, ScheduleGenerationEntity>(&format!(
            r#"
            INSERT INTO schedule_generations (id, config_id, status, request_payload, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {GENERATION_COLUMNS}
            "#
        ))
        .bind(generation.id)
        .bind(generation.config_id)
        .bind(generation.status.as_str())
        .bind(&generation.request_payload)
        .bind(generation.created_by)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ScheduleGenerationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_schedule_generation_by_id");
        let result = sqlx::query_as::<_, ScheduleGenerationEntity>(&format!(
            "SELECT {GENERATION_COLUMNS} FROM schedule_generations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Look up a generation and lock the row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ScheduleGenerationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_schedule_generation_for_update");
        let result = sqlx::query_as::<_, ScheduleGenerationEntity>(&format!(
            "SELECT {GENERATION_COLUMNS} FROM schedule_generations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// All generations, newest first.
    pub async fn list(
        conn: &mut PgConnection,
    ) -> Result<Vec<ScheduleGenerationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_schedule_generations");
        let result = sqlx::query_as::<_, ScheduleGenerationEntity>(&format!(
            "SELECT {GENERATION_COLUMNS} FROM schedule_generations ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Persist status, payloads, error, timestamps and schedule link.
    ///
    /// Only a row still in `pending` is written, so a terminal row is never
    /// overwritten. Returns `None` when the guard rejects the write.
    pub async fn update(
        conn: &mut PgConnection,
        generation: &ScheduleGeneration,
    ) -> Result<Option<ScheduleGenerationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_schedule_generation");
        let result = sqlx::query_as::<_, ScheduleGenerationEntity>(&format!(
            r#"
            UPDATE schedule_generations
            SET status = $2, schedule_id = $3, response_payload = $4, error_message = $5,
                started_at = $6, completed_at = $7
            WHERE id = $1 AND status = 'pending'
            RETURNING {GENERATION_COLUMNS}
            "#
        ))
        .bind(generation.id)
        .bind(generation.status.as_str())
        .bind(generation.schedule_id)
        .bind(&generation.response_payload)
        .bind(&generation.error_message)
        .bind(generation.started_at)
        .bind(generation.completed_at)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }
}
