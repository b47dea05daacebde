//! Schedule generation attempt and its state machine.
//!
//! ```text
//! pending --mark_started--> pending + started_at --+--> completed
//!                                                  +--> failed
//!                                                  +--> infeasible
//! ```
//!
//! Terminal states are absorbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// State machine violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("schedule generation is not in pending status")]
    NotPending,

    #[error("schedule generation has already been started")]
    AlreadyStarted,

    #[error("schedule generation has not been started")]
    NotStarted,
}

/// Persisted generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Completed,
    Failed,
    Infeasible,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
            GenerationStatus::Infeasible => "infeasible",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationStatus::Pending)
    }
}

impl FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "completed" => Ok(GenerationStatus::Completed),
            "failed" => Ok(GenerationStatus::Failed),
            "infeasible" => Ok(GenerationStatus::Infeasible),
            _ => Err(format!("Invalid generation status: {}", s)),
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attempt to produce a schedule through the external solver.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleGeneration {
    pub id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub config_id: Uuid,
    pub status: GenerationStatus,
    pub request_payload: Option<String>,
    pub response_payload: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl ScheduleGeneration {
    /// Creates a pending attempt carrying the serialized solver request.
    pub fn new(config_id: Uuid, created_by: Uuid, request_payload: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            schedule_id: None,
            config_id,
            status: GenerationStatus::Pending,
            request_payload: Some(request_payload),
            response_payload: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            created_by,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Sets `started_at`; status stays pending.
    pub fn mark_started(&mut self, now: DateTime<Utc>) -> Result<(), GenerationError> {
        if self.status != GenerationStatus::Pending {
            return Err(GenerationError::NotPending);
        }
        if self.is_started() {
            return Err(GenerationError::AlreadyStarted);
        }
        self.started_at = Some(now);
        Ok(())
    }

    fn ensure_can_finish(&self) -> Result<(), GenerationError> {
        if self.status.is_terminal() {
            return Err(GenerationError::NotPending);
        }
        if !self.is_started() {
            return Err(GenerationError::NotStarted);
        }
        Ok(())
    }

    pub fn mark_completed(
        &mut self,
        schedule_id: Uuid,
        response_payload: String,
        now: DateTime<Utc>,
    ) -> Result<(), GenerationError> {
        self.ensure_can_finish()?;
        self.status = GenerationStatus::Completed;
        self.schedule_id = Some(schedule_id);
        self.response_payload = Some(response_payload);
        self.completed_at = Some(now);
        Ok(())
    }

    /// A failed attempt never points at a schedule.
    pub fn mark_failed(
        &mut self,
        error_message: String,
        now: DateTime<Utc>,
    ) -> Result<(), GenerationError> {
        self.ensure_can_finish()?;
        self.status = GenerationStatus::Failed;
        self.schedule_id = None;
        self.error_message = Some(error_message);
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn mark_infeasible(
        &mut self,
        response_payload: String,
        error_message: String,
        now: DateTime<Utc>,
    ) -> Result<(), GenerationError> {
        self.ensure_can_finish()?;
        self.status = GenerationStatus::Infeasible;
        self.response_payload = Some(response_payload);
        self.error_message = Some(error_message);
        self.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> ScheduleGeneration {
        let mut g = ScheduleGeneration::new(Uuid::new_v4(), Uuid::new_v4(), "{}".into());
        g.mark_started(Utc::now()).unwrap();
        g
    }

    #[test]
    fn test_new_is_pending() {
        let g = ScheduleGeneration::new(Uuid::new_v4(), Uuid::new_v4(), "{\"a\":1}".into());
        assert_eq!(g.status, GenerationStatus::Pending);
        assert!(!g.is_started());
        assert_eq!(g.request_payload.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_mark_started_keeps_pending() {
        let g = started();
        assert_eq!(g.status, GenerationStatus::Pending);
        assert!(g.started_at.is_some());
    }

    #[test]
    fn test_mark_started_twice_rejected() {
        let mut g = started();
        assert_eq!(g.mark_started(Utc::now()), Err(GenerationError::AlreadyStarted));
    }

    #[test]
    fn test_terminal_requires_started() {
        let mut g = ScheduleGeneration::new(Uuid::new_v4(), Uuid::new_v4(), "{}".into());
        assert_eq!(
            g.mark_completed(Uuid::new_v4(), "{}".into(), Utc::now()),
            Err(GenerationError::NotStarted)
        );
        assert_eq!(
            g.mark_failed("boom".into(), Utc::now()),
            Err(GenerationError::NotStarted)
        );
        assert_eq!(
            g.mark_infeasible("{}".into(), "no".into(), Utc::now()),
            Err(GenerationError::NotStarted)
        );
    }

    #[test]
    fn test_mark_completed() {
        let mut g = started();
        let schedule_id = Uuid::new_v4();
        g.mark_completed(schedule_id, "{\"status\":\"Optimal\"}".into(), Utc::now())
            .unwrap();
        assert_eq!(g.status, GenerationStatus::Completed);
        assert_eq!(g.schedule_id, Some(schedule_id));
        assert!(g.response_payload.is_some());
        assert!(g.completed_at.is_some());
    }

    #[test]
    fn test_mark_failed() {
        let mut g = started();
        g.mark_failed("scheduler service is not available".into(), Utc::now())
            .unwrap();
        assert_eq!(g.status, GenerationStatus::Failed);
        assert!(g.schedule_id.is_none());
        assert_eq!(
            g.error_message.as_deref(),
            Some("scheduler service is not available")
        );
    }

    #[test]
    fn test_mark_infeasible() {
        let mut g = started();
        g.mark_infeasible("{\"status\":\"Infeasible\"}".into(), "no feasible schedule".into(), Utc::now())
            .unwrap();
        assert_eq!(g.status, GenerationStatus::Infeasible);
        assert!(g.response_payload.is_some());
        assert!(g.error_message.is_some());
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let mut g = started();
        g.mark_failed("first".into(), Utc::now()).unwrap();

        assert_eq!(
            g.mark_completed(Uuid::new_v4(), "{}".into(), Utc::now()),
            Err(GenerationError::NotPending)
        );
        assert_eq!(
            g.mark_infeasible("{}".into(), "x".into(), Utc::now()),
            Err(GenerationError::NotPending)
        );
        assert_eq!(g.mark_failed("second".into(), Utc::now()), Err(GenerationError::NotPending));
        assert_eq!(g.mark_started(Utc::now()), Err(GenerationError::NotPending));
        assert_eq!(g.status, GenerationStatus::Failed);
        assert_eq!(g.error_message.as_deref(), Some("first"));
    }

    #[test]
    fn test_status_strings() {
        for status in [
            GenerationStatus::Pending,
            GenerationStatus::Completed,
            GenerationStatus::Failed,
            GenerationStatus::Infeasible,
        ] {
            assert_eq!(status.as_str().parse::<GenerationStatus>().unwrap(), status);
        }
        assert!(!GenerationStatus::Pending.is_terminal());
        assert!(GenerationStatus::Infeasible.is_terminal());
    }
}
