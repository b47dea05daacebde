use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::SchedulerError;
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::schedules::ScheduleServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Failure body. Every error response has exactly this shape.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::RateLimited => "too many requests".to_string(),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("resource already exists".into()),
                Some("23503") => ApiError::NotFound("referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid {}", field))
                })
            })
            .collect();
        messages.sort();

        ApiError::Validation(messages.join(", "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_)
            | AuthError::PasswordMismatch
            | AuthError::PasswordSameAsOld
            | AuthError::VerificationTokenInvalid
            | AuthError::VerificationTokenExpired
            | AuthError::VerificationTokenUsed
            | AuthError::ResetTokenInvalid
            | AuthError::ResetTokenExpired
            | AuthError::ResetTokenUsed => ApiError::Validation(message),
            AuthError::EmailAlreadyExists | AuthError::EmailAlreadyVerified => {
                ApiError::Conflict(message)
            }
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::RefreshTokenExpired
            | AuthError::TokenReuse
            | AuthError::InvalidAccessToken
            | AuthError::MissingAuthContext => ApiError::Unauthorized(message),
            AuthError::AccountInactive | AuthError::EmailNotVerified => {
                ApiError::Forbidden(message)
            }
            AuthError::UserNotFound => ApiError::NotFound(message),
            AuthError::SendVerificationFailed | AuthError::SendResetFailed => {
                ApiError::BadGateway(message)
            }
            AuthError::TokenError(_) | AuthError::PasswordError(_) => ApiError::Internal(message),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
        }
    }
}

impl From<ScheduleServiceError> for ApiError {
    fn from(err: ScheduleServiceError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleServiceError::Schedule(domain::models::ScheduleError::ArchivedActivation) => {
                ApiError::Conflict(message)
            }
            ScheduleServiceError::Schedule(_)
            | ScheduleServiceError::ShiftTemplate(_)
            | ScheduleServiceError::SchedulerConfig(_) => ApiError::Validation(message),
            ScheduleServiceError::Generation(_) => ApiError::Conflict(message),
            ScheduleServiceError::NotFound
            | ScheduleServiceError::GenerationNotFound
            | ScheduleServiceError::ShiftTemplateNotFound
            | ScheduleServiceError::SchedulerConfigNotFound => ApiError::NotFound(message),
            ScheduleServiceError::NoActiveShiftTemplates | ScheduleServiceError::Infeasible => {
                ApiError::Unprocessable(message)
            }
            ScheduleServiceError::Scheduler(scheduler_err) => ApiError::from(scheduler_err),
            ScheduleServiceError::Payload(_) => ApiError::Internal(message),
            ScheduleServiceError::Database(db_err) => ApiError::from(db_err),
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        let message = err.to_string();
        match err {
            SchedulerError::Unavailable(_) => ApiError::ServiceUnavailable(message),
            SchedulerError::InvalidRequest(_) => ApiError::Unprocessable(message),
            SchedulerError::Internal(_) | SchedulerError::UnmarshalResponse(_) => {
                ApiError::BadGateway(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{ScheduleError, UserError};

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_statuses() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unprocessable("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::BadGateway("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let body = body_of(ApiError::Conflict("email already exists".into()).into_response()).await;
        assert_eq!(body, serde_json::json!({"error": "email already exists"}));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let body = body_of(ApiError::Internal("connection reset".into()).into_response()).await;
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn test_rate_limited_message() {
        let body = body_of(ApiError::RateLimited.into_response()).await;
        assert_eq!(body["error"], "too many requests");
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::Validation(UserError::InvalidEmail), StatusCode::BAD_REQUEST),
            (AuthError::EmailAlreadyExists, StatusCode::CONFLICT),
            (AuthError::EmailAlreadyVerified, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::TokenReuse, StatusCode::UNAUTHORIZED),
            (AuthError::RefreshTokenExpired, StatusCode::UNAUTHORIZED),
            (AuthError::MissingAuthContext, StatusCode::UNAUTHORIZED),
            (AuthError::AccountInactive, StatusCode::FORBIDDEN),
            (AuthError::EmailNotVerified, StatusCode::FORBIDDEN),
            (AuthError::PasswordMismatch, StatusCode::BAD_REQUEST),
            (AuthError::VerificationTokenUsed, StatusCode::BAD_REQUEST),
            (AuthError::ResetTokenExpired, StatusCode::BAD_REQUEST),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::SendVerificationFailed, StatusCode::BAD_GATEWAY),
            (AuthError::SendResetFailed, StatusCode::BAD_GATEWAY),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_auth_error_keeps_message() {
        match ApiError::from(AuthError::EmailNotVerified) {
            ApiError::Forbidden(msg) => assert_eq!(msg, "email address has not been verified"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_schedule_error_mapping() {
        let cases = [
            (
                ScheduleServiceError::Schedule(ScheduleError::InvalidTitle),
                StatusCode::BAD_REQUEST,
            ),
            (
                ScheduleServiceError::Schedule(ScheduleError::ArchivedActivation),
                StatusCode::CONFLICT,
            ),
            (ScheduleServiceError::NotFound, StatusCode::NOT_FOUND),
            (ScheduleServiceError::SchedulerConfigNotFound, StatusCode::NOT_FOUND),
            (
                ScheduleServiceError::NoActiveShiftTemplates,
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ScheduleServiceError::Infeasible, StatusCode::UNPROCESSABLE_ENTITY),
            (
                ScheduleServiceError::Scheduler(SchedulerError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ScheduleServiceError::Scheduler(SchedulerError::InvalidRequest("bad".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ScheduleServiceError::Scheduler(SchedulerError::Internal("boom".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ScheduleServiceError::Scheduler(SchedulerError::UnmarshalResponse("eof".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_infeasible_message() {
        match ApiError::from(ScheduleServiceError::Infeasible) {
            ApiError::Unprocessable(msg) => assert_eq!(msg, "no feasible schedule found"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
