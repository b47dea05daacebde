//! Shift template routes.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveTime;
use domain::models::{CourseDemand, ShiftTemplate, ShiftTemplateInput};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, JsonBody};

/// Template fields as sent by clients. Times are `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftTemplateRequest {
    pub name: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    #[serde(default)]
    pub course_demands: Vec<CourseDemand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    pub templates: Vec<ShiftTemplateRequest>,
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            ApiError::Validation(format!(
                "invalid {} format, expected HH:MM or HH:MM:SS",
                field
            ))
        })
}

impl TryFrom<ShiftTemplateRequest> for ShiftTemplateInput {
    type Error = ApiError;

    fn try_from(request: ShiftTemplateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            start_time: parse_time("start_time", &request.start_time)?,
            end_time: parse_time("end_time", &request.end_time)?,
            name: request.name,
            day_of_week: request.day_of_week,
            min_staff: request.min_staff,
            max_staff: request.max_staff,
            course_demands: request.course_demands,
        })
    }
}

/// POST /api/v1/shift-templates
pub async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ShiftTemplateRequest>,
) -> Result<(StatusCode, Json<ShiftTemplate>), ApiError> {
    let template = state.shift_templates.create(request.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// POST /api/v1/shift-templates/bulk
pub async fn create_bulk(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<BulkCreateRequest>,
) -> Result<(StatusCode, Json<Vec<ShiftTemplate>>), ApiError> {
    if request.templates.is_empty() {
        return Err(ApiError::Validation(
            "templates array must not be empty".to_string(),
        ));
    }

    let inputs = request
        .templates
        .into_iter()
        .map(ShiftTemplateInput::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let templates = state.shift_templates.create_bulk(inputs).await?;
    Ok((StatusCode::CREATED, Json(templates)))
}

/// GET /api/v1/shift-templates
pub async fn list_active(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<ShiftTemplate>>, ApiError> {
    Ok(Json(state.shift_templates.list_active(&auth).await?))
}

/// GET /api/v1/shift-templates/all
pub async fn list_all(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<ShiftTemplate>>, ApiError> {
    Ok(Json(state.shift_templates.list_all(&auth).await?))
}

/// GET /api/v1/shift-templates/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShiftTemplate>, ApiError> {
    Ok(Json(state.shift_templates.get(&auth, id).await?))
}

/// PUT /api/v1/shift-templates/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(request): JsonBody<ShiftTemplateRequest>,
) -> Result<Json<ShiftTemplate>, ApiError> {
    Ok(Json(
        state.shift_templates.update(id, request.try_into()?).await?,
    ))
}

/// PATCH /api/v1/shift-templates/:id/activate
pub async fn activate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShiftTemplate>, ApiError> {
    Ok(Json(state.shift_templates.set_active(id, true).await?))
}

/// PATCH /api/v1/shift-templates/:id/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShiftTemplate>, ApiError> {
    Ok(Json(state.shift_templates.set_active(id, false).await?))
}
