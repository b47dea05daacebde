//! Shift template repository for database operations.

use domain::models::ShiftTemplate;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::ShiftTemplateEntity;
use crate::metrics::QueryTimer;

const TEMPLATE_COLUMNS: &str = "id, name, day_of_week, start_time, end_time, min_staff, \
     max_staff, course_demands, is_active, created_at, updated_at";

pub struct ShiftTemplateRepository;

impl ShiftTemplateRepository {
    pub async fn create(
        conn: &mut PgConnection,
        template: &ShiftTemplate,
    ) -> Result<ShiftTemplateEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_shift_template");
        let demands = serde_json::to_value(&template.course_demands)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            r#"
            INSERT INTO shift_templates (id, name, day_of_week, start_time, end_time,
                                         min_staff, max_staff, course_demands, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(template.id)
        .bind(&template.name)
        .bind(template.day_of_week)
        .bind(template.start_time)
        .bind(template.end_time)
        .bind(template.min_staff)
        .bind(template.max_staff)
        .bind(demands)
        .bind(template.is_active)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ShiftTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shift_template_by_id");
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM shift_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Active templates ordered by day and start time.
    pub async fn list_active(
        conn: &mut PgConnection,
    ) -> Result<Vec<ShiftTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_shift_templates");
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS} FROM shift_templates
            WHERE is_active
            ORDER BY day_of_week, start_time
            "#
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn list_all(
        conn: &mut PgConnection,
    ) -> Result<Vec<ShiftTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_shift_templates");
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM shift_templates ORDER BY day_of_week, start_time"
        ))
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        conn: &mut PgConnection,
        template: &ShiftTemplate,
    ) -> Result<Option<ShiftTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_shift_template");
        let demands = serde_json::to_value(&template.course_demands)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            r#"
            UPDATE shift_templates
            SET name = $2, day_of_week = $3, start_time = $4, end_time = $5,
                min_staff = $6, max_staff = $7, course_demands = $8, is_active = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(template.id)
        .bind(&template.name)
        .bind(template.day_of_week)
        .bind(template.start_time)
        .bind(template.end_time)
        .bind(template.min_staff)
        .bind(template.max_staff)
        .bind(demands)
        .bind(template.is_active)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn set_active(
        conn: &mut PgConnection,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<ShiftTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_shift_template_active");
        let result = sqlx::query_as::<_, ShiftTemplateEntity>(&format!(
            r#"
            UPDATE shift_templates
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }
}
