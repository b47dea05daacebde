//! Shift template entity (database row mapping).

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the shift_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct ShiftTemplateEntity {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub course_demands: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ShiftTemplateEntity> for domain::models::ShiftTemplate {
    fn from(entity: ShiftTemplateEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            day_of_week: entity.day_of_week,
            start_time: entity.start_time,
            end_time: entity.end_time,
            min_staff: entity.min_staff,
            max_staff: entity.max_staff,
            course_demands: serde_json::from_value(entity.course_demands).unwrap_or_default(),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_demands_decoded_from_json() {
        let entity = ShiftTemplateEntity {
            id: Uuid::new_v4(),
            name: "Tuesday Noon".to_string(),
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            min_staff: 1,
            max_staff: None,
            course_demands: serde_json::json!([
                {"course_code": "INFO1600", "tutors_required": 2, "weight": 1.5}
            ]),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };

        let template: domain::models::ShiftTemplate = entity.into();
        assert_eq!(template.course_demands.len(), 1);
        assert_eq!(template.course_demands[0].tutors_required, 2);
    }
}
