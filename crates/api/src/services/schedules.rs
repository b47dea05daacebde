//! Schedule store service and the error type shared by the scheduling area.

use chrono::{NaiveDate, Utc};
use domain::models::{
    AuthContext, GenerationError, Schedule, ScheduleError, SchedulerConfigError,
    ShiftTemplateError,
};
use domain::services::SchedulerError;
use persistence::repositories::ScheduleRepository;
use persistence::TxManager;
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors raised by schedules, shift templates, scheduler configs and the
/// generation orchestrator.
#[derive(Debug, Error)]
pub enum ScheduleServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    ShiftTemplate(#[from] ShiftTemplateError),

    #[error(transparent)]
    SchedulerConfig(#[from] SchedulerConfigError),

    #[error("schedule not found")]
    NotFound,

    #[error("schedule generation not found")]
    GenerationNotFound,

    #[error("shift template not found")]
    ShiftTemplateNotFound,

    #[error("scheduler config not found")]
    SchedulerConfigNotFound,

    #[error("no active shift templates")]
    NoActiveShiftTemplates,

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("no feasible schedule found")]
    Infeasible,

    #[error("payload error: {0}")]
    Payload(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<serde_json::Error> for ScheduleServiceError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleServiceError::Payload(err.to_string())
    }
}

/// Fields accepted when creating a schedule by hand.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub title: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub assignments: Option<Value>,
    pub availability_metadata: Option<Value>,
}

/// Lifecycle transitions applied through [`ScheduleService::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTransition {
    Archive,
    Unarchive,
    Activate,
    Deactivate,
}

impl ScheduleTransition {
    fn as_str(&self) -> &'static str {
        match self {
            ScheduleTransition::Archive => "archive",
            ScheduleTransition::Unarchive => "unarchive",
            ScheduleTransition::Activate => "activate",
            ScheduleTransition::Deactivate => "deactivate",
        }
    }

    /// Applies the transition and reports whether the aggregate changed.
    fn apply(&self, schedule: &mut Schedule) -> Result<bool, ScheduleError> {
        Ok(match self {
            ScheduleTransition::Archive => schedule.archive(Utc::now()),
            ScheduleTransition::Unarchive => schedule.unarchive(),
            ScheduleTransition::Activate => schedule.activate()?,
            ScheduleTransition::Deactivate => schedule.deactivate(),
        })
    }
}

/// Schedule CRUD. Reads run under the caller's row-level policies; writes
/// run as the system.
#[derive(Clone)]
pub struct ScheduleService {
    tx: TxManager,
}

impl ScheduleService {
    pub fn new(tx: TxManager) -> Self {
        Self { tx }
    }

    pub async fn create(
        &self,
        auth: &AuthContext,
        input: NewSchedule,
    ) -> Result<Schedule, ScheduleServiceError> {
        let mut schedule = Schedule::new(
            &input.title,
            auth.user_id,
            input.effective_from,
            input.effective_to,
        )?;
        if let Some(assignments) = input.assignments {
            schedule.assignments = assignments;
        }
        if let Some(metadata) = input.availability_metadata {
            schedule.availability_metadata = metadata;
        }

        let created = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let entity = ScheduleRepository::create(conn, &schedule).await?;
                    Ok::<_, ScheduleServiceError>(Schedule::from(entity))
                })
            })
            .await?;

        info!(schedule_id = %created.id, "Schedule created");
        Ok(created)
    }

    /// Non-archived schedules, newest first.
    pub async fn list(&self, auth: &AuthContext) -> Result<Vec<Schedule>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = ScheduleRepository::list(conn).await?;
                    Ok::<_, ScheduleServiceError>(rows.into_iter().map(Schedule::from).collect())
                })
            })
            .await
    }

    pub async fn list_archived(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<Schedule>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = ScheduleRepository::list_archived(conn).await?;
                    Ok::<_, ScheduleServiceError>(rows.into_iter().map(Schedule::from).collect())
                })
            })
            .await
    }

    pub async fn get_active(&self, auth: &AuthContext) -> Result<Schedule, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let entity = ScheduleRepository::find_active(conn)
                        .await?
                        .ok_or(ScheduleServiceError::NotFound)?;
                    Ok::<_, ScheduleServiceError>(Schedule::from(entity))
                })
            })
            .await
    }

    pub async fn get(
        &self,
        auth: &AuthContext,
        id: Uuid,
    ) -> Result<Schedule, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, move |conn| {
                Box::pin(async move {
                    let entity = ScheduleRepository::find_by_id(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::NotFound)?;
                    Ok::<_, ScheduleServiceError>(Schedule::from(entity))
                })
            })
            .await
    }

    /// Applies a lifecycle transition. Repeating a transition is a no-op
    /// that returns the current aggregate.
    ///
    /// Activation deactivates every other schedule in the same transaction.
    pub async fn transition(
        &self,
        id: Uuid,
        transition: ScheduleTransition,
    ) -> Result<Schedule, ScheduleServiceError> {
        let schedule = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut schedule: Schedule = ScheduleRepository::find_by_id(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::NotFound)?
                        .into();

                    if !transition.apply(&mut schedule)? {
                        return Ok(schedule);
                    }

                    if transition == ScheduleTransition::Activate {
                        ScheduleRepository::deactivate_all_except(conn, schedule.id).await?;
                    }

                    schedule.updated_at = Some(Utc::now());
                    let entity = ScheduleRepository::update(conn, &schedule)
                        .await?
                        .ok_or(ScheduleServiceError::NotFound)?;
                    Ok::<_, ScheduleServiceError>(Schedule::from(entity))
                })
            })
            .await?;

        info!(
            schedule_id = %schedule.id,
            transition = transition.as_str(),
            "Schedule transition applied"
        );
        Ok(schedule)
    }
}
