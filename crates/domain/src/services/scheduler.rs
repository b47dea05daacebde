//! Contract for the external schedule solver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::models::solver::{
    GenerateScheduleRequest, GenerateScheduleResponse, SolverAssignment, SolverMetadata,
    SolverStatus,
};

/// Transport outcomes of a solver call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("scheduler service is not available: {0}")]
    Unavailable(String),

    #[error("invalid schedule request: {0}")]
    InvalidRequest(String),

    #[error("scheduler internal error: {0}")]
    Internal(String),

    #[error("failed to decode schedule response: {0}")]
    UnmarshalResponse(String),
}

impl SchedulerError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulerError::Unavailable(_) => "unavailable",
            SchedulerError::InvalidRequest(_) => "invalid_request",
            SchedulerError::Internal(_) => "internal",
            SchedulerError::UnmarshalResponse(_) => "unmarshal",
        }
    }
}

/// Health-probes and invokes the solver.
#[async_trait::async_trait]
pub trait SchedulerClient: Send + Sync {
    async fn generate_schedule(
        &self,
        request: &GenerateScheduleRequest,
    ) -> Result<GenerateScheduleResponse, SchedulerError>;
}

/// In-memory solver with a fixed outcome. Records every request it receives.
#[derive(Debug, Clone)]
pub struct MockSchedulerClient {
    outcome: Option<Result<GenerateScheduleResponse, SchedulerError>>,
    requests: Arc<Mutex<Vec<GenerateScheduleRequest>>>,
}

impl Default for MockSchedulerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSchedulerClient {
    /// Assigns the first assistant to every shift and reports `Optimal`.
    pub fn new() -> Self {
        Self {
            outcome: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always returns `response`.
    pub fn returning(response: GenerateScheduleResponse) -> Self {
        Self {
            outcome: Some(Ok(response)),
            ..Self::new()
        }
    }

    /// Always fails with `error`.
    pub fn failing_with(error: SchedulerError) -> Self {
        Self {
            outcome: Some(Err(error)),
            ..Self::new()
        }
    }

    /// Fails the health probe.
    pub fn unavailable() -> Self {
        Self::failing_with(SchedulerError::Unavailable(
            "health check failed: connection refused".to_string(),
        ))
    }

    pub fn requests(&self) -> Vec<GenerateScheduleRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn solve(request: &GenerateScheduleRequest) -> GenerateScheduleResponse {
        let mut assignments = Vec::new();
        let mut assistant_hours = HashMap::new();

        if let Some(assistant) = request.assistants.first() {
            for shift in &request.shifts {
                assignments.push(SolverAssignment {
                    assistant_id: assistant.id.clone(),
                    shift_id: shift.id.clone(),
                    day_of_week: shift.day_of_week,
                    start: shift.start.clone(),
                    end: shift.end.clone(),
                });
            }
            assistant_hours.insert(assistant.id.clone(), assignments.len() as f64);
        }

        GenerateScheduleResponse {
            status: SolverStatus::Optimal,
            assignments,
            assistant_hours,
            metadata: SolverMetadata {
                objective_value: Some(0.0),
                solver_status_code: 1,
                solver_status: Some("Optimal".to_string()),
                ..SolverMetadata::default()
            },
        }
    }
}

#[async_trait::async_trait]
impl SchedulerClient for MockSchedulerClient {
    async fn generate_schedule(
        &self,
        request: &GenerateScheduleRequest,
    ) -> Result<GenerateScheduleResponse, SchedulerError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match &self.outcome {
            Some(Err(err)) => {
                tracing::warn!(error = %err, "Mock scheduler simulating failure");
                Err(err.clone())
            }
            Some(Ok(response)) => Ok(response.clone()),
            None => {
                tracing::info!(
                    shifts = request.shifts.len(),
                    assistants = request.assistants.len(),
                    "Mock: Would call scheduler"
                );
                Ok(Self::solve(request))
            }
        }
    }
}
