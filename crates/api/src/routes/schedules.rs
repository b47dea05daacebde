//! Schedule routes, including generation through the solver.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use domain::models::{Schedule, SolverAssistant};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, JsonBody};
use crate::services::{GenerateSchedule, NewSchedule, ScheduleTransition};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    pub title: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub assignments: Option<Value>,
    pub availability_metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateScheduleBody {
    pub config_id: Uuid,
    pub title: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    pub assistants: Vec<SolverAssistant>,
}

/// POST /api/v1/schedules
pub async fn create(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    JsonBody(request): JsonBody<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), ApiError> {
    let schedule = state
        .schedules
        .create(
            &auth,
            NewSchedule {
                title: request.title,
                effective_from: request.effective_from,
                effective_to: request.effective_to,
                assignments: request.assignments,
                availability_metadata: request.availability_metadata,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// POST /api/v1/schedules/generate
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    JsonBody(request): JsonBody<GenerateScheduleBody>,
) -> Result<(StatusCode, Json<Schedule>), ApiError> {
    let schedule = state
        .generations
        .generate(
            &auth,
            GenerateSchedule {
                config_id: request.config_id,
                title: request.title,
                effective_from: request.effective_from,
                effective_to: request.effective_to,
                assistants: request.assistants,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /api/v1/schedules
pub async fn list(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(state.schedules.list(&auth).await?))
}

/// GET /api/v1/schedules/archived
pub async fn list_archived(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(state.schedules.list_archived(&auth).await?))
}

/// GET /api/v1/schedules/active
pub async fn get_active(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.schedules.get_active(&auth).await?))
}

/// GET /api/v1/schedules/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.schedules.get(&auth, id).await?))
}

async fn transition(
    state: AppState,
    id: Uuid,
    transition: ScheduleTransition,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.schedules.transition(id, transition).await?))
}

/// PATCH /api/v1/schedules/:id/archive
pub async fn archive(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    transition(state, id, ScheduleTransition::Archive).await
}

/// PATCH /api/v1/schedules/:id/unarchive
pub async fn unarchive(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    transition(state, id, ScheduleTransition::Unarchive).await
}

/// PATCH /api/v1/schedules/:id/activate
pub async fn activate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    transition(state, id, ScheduleTransition::Activate).await
}

/// PATCH /api/v1/schedules/:id/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    transition(state, id, ScheduleTransition::Deactivate).await
}
