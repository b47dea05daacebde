//! Wire types exchanged with the external schedule solver.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::scheduler_config::SchedulerConfig;
use super::shift_template::{CourseDemand, ShiftTemplate};

/// Wire format for times of day.
pub const SOLVER_TIME_FORMAT: &str = "%H:%M:%S";

/// A weekly window in which an assistant can work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day_of_week: i32,
    pub start: String,
    pub end: String,
}

/// Assistant supplied by the caller of a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverAssistant {
    pub id: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    pub min_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours: Option<f64>,
    #[serde(default)]
    pub cost_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverShift {
    pub id: String,
    pub day_of_week: i32,
    pub start: String,
    pub end: String,
    pub course_demands: Vec<CourseDemand>,
    pub min_staff: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_staff: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl From<&ShiftTemplate> for SolverShift {
    fn from(template: &ShiftTemplate) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("name".to_string(), template.name.clone());

        Self {
            id: template.id.to_string(),
            day_of_week: template.day_of_week,
            start: template.start_time.format(SOLVER_TIME_FORMAT).to_string(),
            end: template.end_time.format(SOLVER_TIME_FORMAT).to_string(),
            course_demands: template.course_demands.clone(),
            min_staff: template.min_staff,
            max_staff: template.max_staff,
            metadata: Some(metadata),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub course_shortfall_penalty: f64,
    pub min_hours_penalty: f64,
    pub max_hours_penalty: f64,
    pub understaffed_penalty: f64,
    pub extra_hours_penalty: f64,
    pub max_extra_penalty: f64,
    pub baseline_hours_target: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_time_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_gap: Option<f64>,
    pub log_solver_output: bool,
}

impl From<&SchedulerConfig> for SolverConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            course_shortfall_penalty: config.course_shortfall_penalty,
            min_hours_penalty: config.min_hours_penalty,
            max_hours_penalty: config.max_hours_penalty,
            understaffed_penalty: config.understaffed_penalty,
            extra_hours_penalty: config.extra_hours_penalty,
            max_extra_penalty: config.max_extra_penalty,
            baseline_hours_target: config.baseline_hours_target,
            solver_time_limit: config.solver_time_limit,
            solver_gap: config.solver_gap,
            log_solver_output: config.log_solver_output,
        }
    }
}

/// Body of `POST /api/v1/schedules/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateScheduleRequest {
    pub assistants: Vec<SolverAssistant>,
    pub shifts: Vec<SolverShift>,
    pub scheduler_config: SolverConfig,
}

impl GenerateScheduleRequest {
    /// Projects active templates and a config into the solver input.
    pub fn build(
        assistants: Vec<SolverAssistant>,
        templates: &[ShiftTemplate],
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            assistants,
            shifts: templates.iter().map(SolverShift::from).collect(),
            scheduler_config: SolverConfig::from(config),
        }
    }
}

/// Solver outcome. Statuses this service does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown(String),
}

impl SolverStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SolverStatus::Optimal => "Optimal",
            SolverStatus::Feasible => "Feasible",
            SolverStatus::Infeasible => "Infeasible",
            SolverStatus::Unknown(s) => s,
        }
    }

    /// Whether the response carries a usable roster.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl From<String> for SolverStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Optimal" => SolverStatus::Optimal,
            "Feasible" => SolverStatus::Feasible,
            "Infeasible" => SolverStatus::Infeasible,
            _ => SolverStatus::Unknown(s),
        }
    }
}

impl From<SolverStatus> for String {
    fn from(status: SolverStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverAssignment {
    pub assistant_id: String,
    pub shift_id: String,
    pub day_of_week: i32,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    #[serde(default)]
    pub solver_status_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<String>,
    #[serde(default)]
    pub course_shortfalls: HashMap<String, f64>,
    #[serde(default)]
    pub staff_shortfalls: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateScheduleResponse {
    pub status: SolverStatus,
    #[serde(default)]
    pub assignments: Vec<SolverAssignment>,
    #[serde(default)]
    pub assistant_hours: HashMap<String, f64>,
    #[serde(default)]
    pub metadata: SolverMetadata,
}
