//! Scheduler config repository for database operations.

use domain::models::SchedulerConfig;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::SchedulerConfigEntity;
use crate::metrics::QueryTimer;

const CONFIG_COLUMNS: &str = "id, name, course_shortfall_penalty, min_hours_penalty, \
     max_hours_penalty, understaffed_penalty, extra_hours_penalty, max_extra_penalty, \
     baseline_hours_target, solver_time_limit, solver_gap, log_solver_output, is_default, \
     created_at, updated_at";

pub struct SchedulerConfigRepository;

impl SchedulerConfigRepository {
    pub async fn create(
        conn: &mut PgConnection,
        config: &SchedulerConfig,
    ) -> Result<SchedulerConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_scheduler_config");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            r#"
            INSERT INTO scheduler_configs (id, name, course_shortfall_penalty, min_hours_penalty,
                                           max_hours_penalty, understaffed_penalty,
                                           extra_hours_penalty, max_extra_penalty,
                                           baseline_hours_target, solver_time_limit, solver_gap,
                                           log_solver_output, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(config.id)
        .bind(&config.name)
        .bind(config.course_shortfall_penalty)
        .bind(config.min_hours_penalty)
        .bind(config.max_hours_penalty)
        .bind(config.understaffed_penalty)
        .bind(config.extra_hours_penalty)
        .bind(config.max_extra_penalty)
        .bind(config.baseline_hours_target)
        .bind(config.solver_time_limit)
        .bind(config.solver_gap)
        .bind(config.log_solver_output)
        .bind(config.is_default)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_scheduler_config_by_id");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM scheduler_configs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_default(
        conn: &mut PgConnection,
    ) -> Result<Option<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_default_scheduler_config");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM scheduler_configs WHERE is_default"
        ))
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn list(
        conn: &mut PgConnection,
    ) -> Result<Vec<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_scheduler_configs");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM scheduler_configs ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        conn: &mut PgConnection,
        config: &SchedulerConfig,
    ) -> Result<Option<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_scheduler_config");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            r#"
            UPDATE scheduler_configs
            SET name = $2, course_shortfall_penalty = $3, min_hours_penalty = $4,
                max_hours_penalty = $5, understaffed_penalty = $6, extra_hours_penalty = $7,
                max_extra_penalty = $8, baseline_hours_target = $9, solver_time_limit = $10,
                solver_gap = $11, log_solver_output = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(config.id)
        .bind(&config.name)
        .bind(config.course_shortfall_penalty)
        .bind(config.min_hours_penalty)
        .bind(config.max_hours_penalty)
        .bind(config.understaffed_penalty)
        .bind(config.extra_hours_penalty)
        .bind(config.max_extra_penalty)
        .bind(config.baseline_hours_target)
        .bind(config.solver_time_limit)
        .bind(config.solver_gap)
        .bind(config.log_solver_output)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Make `id` the only default config.
    pub async fn set_default(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_default_scheduler_config");
        sqlx::query(
            r#"
            UPDATE scheduler_configs
            SET is_default = false, updated_at = NOW()
            WHERE is_default AND id <> $1
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query_as::<_, SchedulerConfigEntity>(&format!(
            r#"
            UPDATE scheduler_configs
            SET is_default = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }
}
