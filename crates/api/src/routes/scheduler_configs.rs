//! Scheduler config routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{SchedulerConfig, SchedulerConfigInput};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, JsonBody};

/// POST /api/v1/scheduler-configs
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SchedulerConfigInput>,
) -> Result<(StatusCode, Json<SchedulerConfig>), ApiError> {
    let config = state.scheduler_configs.create(input).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// GET /api/v1/scheduler-configs
pub async fn list(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<SchedulerConfig>>, ApiError> {
    Ok(Json(state.scheduler_configs.list(&auth).await?))
}

/// GET /api/v1/scheduler-configs/default
pub async fn get_default(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<SchedulerConfig>, ApiError> {
    Ok(Json(state.scheduler_configs.get_default(&auth).await?))
}

/// GET /api/v1/scheduler-configs/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    Ok(Json(state.scheduler_configs.get(&auth, id).await?))
}

/// PUT /api/v1/scheduler-configs/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(input): JsonBody<SchedulerConfigInput>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    Ok(Json(state.scheduler_configs.update(id, input).await?))
}

/// PATCH /api/v1/scheduler-configs/:id/set-default
pub async fn set_default(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    Ok(Json(state.scheduler_configs.set_default(id).await?))
}
