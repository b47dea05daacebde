//! Solver configuration: penalty weights and solver limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerConfigError {
    #[error("invalid config name")]
    InvalidName,

    #[error("penalty weights must be non-negative")]
    InvalidPenaltyWeight,

    #[error("baseline hours target must be at least 1")]
    InvalidBaselineHours,
}

/// Mutable fields of a scheduler config, validated as a unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfigInput {
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
}

impl SchedulerConfigInput {
    pub fn validate(&self) -> Result<(), SchedulerConfigError> {
        if self.name.trim().is_empty() {
            return Err(SchedulerConfigError::InvalidName);
        }
        let weights = [
            self.course_shortfall_penalty,
            self.min_hours_penalty,
            self.max_hours_penalty,
            self.understaffed_penalty,
            self.extra_hours_penalty,
            self.max_extra_penalty,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SchedulerConfigError::InvalidPenaltyWeight);
        }
        if self.baseline_hours_target < 1 {
            return Err(SchedulerConfigError::InvalidBaselineHours);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerConfig {
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

impl SchedulerConfig {
    pub fn new(input: SchedulerConfigInput) -> Result<Self, SchedulerConfigError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            course_shortfall_penalty: input.course_shortfall_penalty,
            min_hours_penalty: input.min_hours_penalty,
            max_hours_penalty: input.max_hours_penalty,
            understaffed_penalty: input.understaffed_penalty,
            extra_hours_penalty: input.extra_hours_penalty,
            max_extra_penalty: input.max_extra_penalty,
            baseline_hours_target: input.baseline_hours_target,
            solver_time_limit: input.solver_time_limit,
            solver_gap: input.solver_gap,
            log_solver_output: input.log_solver_output,
            is_default: false,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn update(&mut self, input: SchedulerConfigInput) -> Result<(), SchedulerConfigError> {
        input.validate()?;
        self.name = input.name.trim().to_string();
        self.course_shortfall_penalty = input.course_shortfall_penalty;
        self.min_hours_penalty = input.min_hours_penalty;
        self.max_hours_penalty = input.max_hours_penalty;
        self.understaffed_penalty = input.understaffed_penalty;
        self.extra_hours_penalty = input.extra_hours_penalty;
        self.max_extra_penalty = input.max_extra_penalty;
        self.baseline_hours_target = input.baseline_hours_target;
        self.solver_time_limit = input.solver_time_limit;
        self.solver_gap = input.solver_gap;
        self.log_solver_output = input.log_solver_output;
        Ok(())
    }
}
