//! Shift template aggregate: a recurring weekly slot the solver staffs.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftTemplateError {
    #[error("invalid shift template name")]
    InvalidName,

    #[error("day of week must be between 0 (Monday) and 6 (Sunday)")]
    InvalidDayOfWeek,

    #[error("start time must be before end time")]
    InvalidShiftTime,

    #[error("min staff must be at least 1 and max staff must be >= min staff")]
    InvalidStaffing,
}

/// Tutors required for one course during a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDemand {
    pub course_code: String,
    pub tutors_required: i32,
    pub weight: f64,
}

/// Mutable fields of a shift template, validated as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftTemplateInput {
    pub name: String,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub course_demands: Vec<CourseDemand>,
}

impl ShiftTemplateInput {
    pub fn validate(&self) -> Result<(), ShiftTemplateError> {
        if self.name.trim().is_empty() {
            return Err(ShiftTemplateError::InvalidName);
        }
        if !(0..=6).contains(&self.day_of_week) {
            return Err(ShiftTemplateError::InvalidDayOfWeek);
        }
        if self.start_time >= self.end_time {
            return Err(ShiftTemplateError::InvalidShiftTime);
        }
        if self.min_staff < 1 {
            return Err(ShiftTemplateError::InvalidStaffing);
        }
        if matches!(self.max_staff, Some(max) if max < self.min_staff) {
            return Err(ShiftTemplateError::InvalidStaffing);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftTemplate {
    pub id: Uuid,
    pub name: String,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub course_demands: Vec<CourseDemand>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShiftTemplate {
    /// Creates an active template.
    pub fn new(input: ShiftTemplateInput) -> Result<Self, ShiftTemplateError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            day_of_week: input.day_of_week,
            start_time: input.start_time,
            end_time: input.end_time,
            min_staff: input.min_staff,
            max_staff: input.max_staff,
            course_demands: input.course_demands,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn update(&mut self, input: ShiftTemplateInput) -> Result<(), ShiftTemplateError> {
        input.validate()?;
        self.name = input.name.trim().to_string();
        self.day_of_week = input.day_of_week;
        self.start_time = input.start_time;
        self.end_time = input.end_time;
        self.min_staff = input.min_staff;
        self.max_staff = input.max_staff;
        self.course_demands = input.course_demands;
        Ok(())
    }
}
