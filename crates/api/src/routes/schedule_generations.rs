//! Read-only view of schedule generation attempts.

use axum::{extract::State, Json};
use domain::models::ScheduleGeneration;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser};

/// GET /api/v1/schedule-generations
pub async fn list(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<ScheduleGeneration>>, ApiError> {
    Ok(Json(state.generations.list(&auth).await?))
}

/// GET /api/v1/schedule-generations/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ScheduleGeneration>, ApiError> {
    Ok(Json(state.generations.get(&auth, id).await?))
}
