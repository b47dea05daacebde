//! Schedule repository for database operations.

use domain::models::Schedule;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::ScheduleEntity;
use crate::metrics::QueryTimer;

const SCHEDULE_COLUMNS: &str = "id, title, is_active, assignments, availability_metadata, \
     created_at, created_by, updated_at, archived_at, effective_from, effective_to, \
     generation_id, scheduler_metadata";

pub struct ScheduleRepository;

impl ScheduleRepository {
    pub async fn create(
        conn: &mut PgConnection,
        schedule: &Schedule,
    ) -> Result<ScheduleEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_schedule");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            r#"
            INSERT INTO schedules (id, title, is_active, assignments, availability_metadata,
                                   created_by, archived_at, effective_from, effective_to,
                                   generation_id, scheduler_metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(schedule.id)
        .bind(&schedule.title)
        .bind(schedule.is_active)
        .bind(&schedule.assignments)
        .bind(&schedule.availability_metadata)
        .bind(schedule.created_by)
        .bind(schedule.archived_at)
        .bind(schedule.effective_from)
        .bind(schedule.effective_to)
        .bind(schedule.generation_id)
        .bind(&schedule.scheduler_metadata)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_schedule_by_id");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Non-archived schedules, newest first.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<ScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_schedules");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS} FROM schedules
            WHERE archived_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Archived schedules, most recently archived first.
    pub async fn list_archived(
        conn: &mut PgConnection,
    ) -> Result<Vec<ScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_archived_schedules");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS} FROM schedules
            WHERE archived_at IS NOT NULL
            ORDER BY archived_at DESC
            "#
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// The active, non-archived schedule.
    pub async fn find_active(
        conn: &mut PgConnection,
    ) -> Result<Option<ScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_schedule");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS} FROM schedules
            WHERE is_active AND archived_at IS NULL
            ORDER BY updated_at DESC NULLS LAST, created_at DESC
            LIMIT 1
            "#
        ))
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Write the mutable fields of `schedule`.
    pub async fn update(
        conn: &mut PgConnection,
        schedule: &Schedule,
    ) -> Result<Option<ScheduleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_schedule");
        let result = sqlx::query_as::<_, ScheduleEntity>(&format!(
            r#"
            UPDATE schedules
            SET title = $2, is_active = $3, assignments = $4, availability_metadata = $5,
                archived_at = $6, effective_from = $7, effective_to = $8,
                generation_id = $9, scheduler_metadata = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(schedule.id)
        .bind(&schedule.title)
        .bind(schedule.is_active)
        .bind(&schedule.assignments)
        .bind(&schedule.availability_metadata)
        .bind(schedule.archived_at)
        .bind(schedule.effective_from)
        .bind(schedule.effective_to)
        .bind(schedule.generation_id)
        .bind(&schedule.scheduler_metadata)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Deactivate every active schedule other than `keep_id`.
    pub async fn deactivate_all_except(
        conn: &mut PgConnection,
        keep_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_other_schedules");
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET is_active = false, updated_at = NOW()
            WHERE is_active AND id <> $1
            "#,
        )
        .bind(keep_id)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
