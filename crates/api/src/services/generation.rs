//! Schedule generation orchestrator.
//!
//! Generation is a saga, not a single transaction. Each step commits on its
//! own so the attempt stays observable while the solver runs:
//!
//! 1. validate the schedule fields without I/O
//! 2. tx A: assemble the solver request and insert a pending attempt
//! 3. tx B: mark the attempt started
//! 4. call the solver outside any transaction
//! 5. tx C/D: record a failed or infeasible outcome, or
//! 6. tx E: insert the schedule and complete the attempt
//!
//! Any failure after step 3 is compensated by marking the attempt failed in
//! a fresh transaction, so a started attempt always reaches a terminal
//! state.

use chrono::{NaiveDate, Utc};
use domain::models::{
    AuthContext, GenerateScheduleRequest, GenerateScheduleResponse, GenerationError, Schedule,
    ScheduleGeneration, SchedulerConfig, ShiftTemplate, SolverAssistant,
};
use domain::services::{SchedulerClient, SchedulerError};
use metrics::{counter, histogram};
use persistence::repositories::{
    ScheduleGenerationRepository, ScheduleRepository, SchedulerConfigRepository,
    ShiftTemplateRepository,
};
use persistence::TxManager;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::schedules::ScheduleServiceError;

const INFEASIBLE_MESSAGE: &str = "no feasible schedule";

/// Input of a generation request.
#[derive(Debug, Clone)]
pub struct GenerateSchedule {
    pub config_id: Uuid,
    pub title: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub assistants: Vec<SolverAssistant>,
}

/// Drives a generation attempt through the solver.
#[derive(Clone)]
pub struct ScheduleGenerationService {
    tx: TxManager,
    scheduler: Arc<dyn SchedulerClient>,
}

impl ScheduleGenerationService {
    pub fn new(tx: TxManager, scheduler: Arc<dyn SchedulerClient>) -> Self {
        Self { tx, scheduler }
    }

    /// Generates and persists a schedule.
    pub async fn generate(
        &self,
        auth: &AuthContext,
        input: GenerateSchedule,
    ) -> Result<Schedule, ScheduleServiceError> {
        // Validates title and period before anything is written.
        let draft = Schedule::new(
            &input.title,
            auth.user_id,
            input.effective_from,
            input.effective_to,
        )?;

        let (generation_id, request) = self
            .create_attempt(input.config_id, auth.user_id, input.assistants)
            .await?;

        self.mark_started(generation_id).await?;

        let started = Instant::now();
        let outcome = self.scheduler.generate_schedule(&request).await;
        histogram!("scheduler_request_duration_seconds").record(started.elapsed().as_secs_f64());

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                counter!("scheduler_requests_total", "outcome" => err.kind()).increment(1);
                warn!(
                    generation_id = %generation_id,
                    kind = err.kind(),
                    error = %err,
                    "Scheduler call failed"
                );
                self.compensate(generation_id, err.to_string()).await;
                record_generation("failed");
                return Err(err.into());
            }
        };
        counter!("scheduler_requests_total", "outcome" => response.status.as_str().to_lowercase())
            .increment(1);

        if !response.status.has_solution() {
            return Err(self.reject_response(generation_id, &response).await);
        }

        match self.persist_schedule(generation_id, draft, &response).await {
            Ok(schedule) => {
                record_generation("completed");
                info!(
                    generation_id = %generation_id,
                    schedule_id = %schedule.id,
                    assignments = response.assignments.len(),
                    "Schedule generated"
                );
                Ok(schedule)
            }
            Err(err) => {
                error!(
                    generation_id = %generation_id,
                    error = %err,
                    "Failed to persist generated schedule"
                );
                self.compensate(generation_id, err.to_string()).await;
                record_generation("failed");
                Err(err)
            }
        }
    }

    /// Attempts, newest first.
    pub async fn list(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<ScheduleGeneration>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = ScheduleGenerationRepository::list(conn).await?;
                    Ok::<_, ScheduleServiceError>(
                        rows.into_iter().map(ScheduleGeneration::from).collect(),
                    )
                })
            })
            .await
    }

    pub async fn get(
        &self,
        auth: &AuthContext,
        id: Uuid,
    ) -> Result<ScheduleGeneration, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, move |conn| {
                Box::pin(async move {
                    let entity = ScheduleGenerationRepository::find_by_id(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::GenerationNotFound)?;
                    Ok::<_, ScheduleServiceError>(ScheduleGeneration::from(entity))
                })
            })
            .await
    }

    /// Transaction A.
    async fn create_attempt(
        &self,
        config_id: Uuid,
        created_by: Uuid,
        assistants: Vec<SolverAssistant>,
    ) -> Result<(Uuid, GenerateScheduleRequest), ScheduleServiceError> {
        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let templates: Vec<ShiftTemplate> =
                        ShiftTemplateRepository::list_active(conn)
                            .await?
                            .into_iter()
                            .map(ShiftTemplate::from)
                            .collect();
                    if templates.is_empty() {
                        return Err(ScheduleServiceError::NoActiveShiftTemplates);
                    }

                    let config: SchedulerConfig =
                        SchedulerConfigRepository::find_by_id(conn, config_id)
                            .await?
                            .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?
                            .into();

                    let request = GenerateScheduleRequest::build(assistants, &templates, &config);
                    let payload = serde_json::to_string(&request)?;

                    let generation = ScheduleGeneration::new(config.id, created_by, payload);
                    let entity = ScheduleGenerationRepository::create(conn, &generation).await?;

                    Ok::<_, ScheduleServiceError>((entity.id, request))
                })
            })
            .await
    }

    /// Transaction B.
    async fn mark_started(&self, generation_id: Uuid) -> Result<(), ScheduleServiceError> {
        self.update_attempt(generation_id, |generation| {
            generation.mark_started(Utc::now())
        })
        .await
    }

    /// Transaction D, or C for a status the solver should never send.
    async fn reject_response(
        &self,
        generation_id: Uuid,
        response: &GenerateScheduleResponse,
    ) -> ScheduleServiceError {
        if response.status != domain::models::SolverStatus::Infeasible {
            let err = SchedulerError::Internal(format!(
                "unknown solver status: {}",
                response.status.as_str()
            ));
            warn!(generation_id = %generation_id, error = %err, "Unexpected solver status");
            self.compensate(generation_id, err.to_string()).await;
            record_generation("failed");
            return err.into();
        }

        let payload = match serde_json::to_string(response) {
            Ok(payload) => payload,
            Err(err) => {
                self.compensate(generation_id, err.to_string()).await;
                record_generation("failed");
                return err.into();
            }
        };

        let recorded = self
            .update_attempt(generation_id, move |generation| {
                generation.mark_infeasible(payload, INFEASIBLE_MESSAGE.to_string(), Utc::now())
            })
            .await;

        match recorded {
            Ok(()) => {
                record_generation("infeasible");
                info!(generation_id = %generation_id, "Solver reported no feasible schedule");
                ScheduleServiceError::Infeasible
            }
            Err(err) => {
                self.compensate(generation_id, err.to_string()).await;
                record_generation("failed");
                err
            }
        }
    }

    /// Transaction E.
    async fn persist_schedule(
        &self,
        generation_id: Uuid,
        mut schedule: Schedule,
        response: &GenerateScheduleResponse,
    ) -> Result<Schedule, ScheduleServiceError> {
        schedule.assignments = serde_json::to_value(&response.assignments)?;
        schedule.scheduler_metadata = Some(serde_json::to_value(&response.metadata)?);
        schedule.generation_id = Some(generation_id);
        let response_payload = serde_json::to_string(response)?;

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut generation: ScheduleGeneration =
                        ScheduleGenerationRepository::find_by_id_for_update(conn, generation_id)
                            .await?
                            .ok_or(ScheduleServiceError::GenerationNotFound)?
                            .into();

                    let created: Schedule = ScheduleRepository::create(conn, &schedule)
                        .await?
                        .into();

                    generation.mark_completed(created.id, response_payload, Utc::now())?;
                    ScheduleGenerationRepository::update(conn, &generation)
                        .await?
                        .ok_or(GenerationError::NotPending)?;

                    Ok::<_, ScheduleServiceError>(created)
                })
            })
            .await
    }

    /// Transaction C and the compensation step. Errors are logged, never
    /// returned, so the caller still sees the failure that caused them.
    async fn compensate(&self, generation_id: Uuid, message: String) {
        let result = self
            .update_attempt(generation_id, move |generation| {
                generation.mark_failed(message, Utc::now())
            })
            .await;

        if let Err(err) = result {
            error!(
                generation_id = %generation_id,
                error = %err,
                "Failed to mark schedule generation as failed"
            );
        }
    }

    /// Loads the attempt under a row lock, applies `change` and writes it
    /// back in one system transaction.
    async fn update_attempt<F>(
        &self,
        generation_id: Uuid,
        change: F,
    ) -> Result<(), ScheduleServiceError>
    where
        F: FnOnce(&mut ScheduleGeneration) -> Result<(), GenerationError> + Send + 'static,
    {
        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut generation: ScheduleGeneration =
                        ScheduleGenerationRepository::find_by_id_for_update(conn, generation_id)
                            .await?
                            .ok_or(ScheduleServiceError::GenerationNotFound)?
                            .into();

                    change(&mut generation)?;

                    ScheduleGenerationRepository::update(conn, &generation)
                        .await?
                        .ok_or(GenerationError::NotPending)?;
                    Ok::<_, ScheduleServiceError>(())
                })
            })
            .await
    }
}

fn record_generation(status: &'static str) {
    counter!("schedule_generations_total", "status" => status).increment(1);
}
