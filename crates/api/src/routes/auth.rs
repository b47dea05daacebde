//! Identity routes: registration, sessions and password management.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthUser, JsonBody};
use crate::services::TokenPair;

const FORGOT_PASSWORD_MESSAGE: &str =
    "if an account exists with that email, a password reset link has been sent";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "new password is required"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "new password is required"))]
    pub new_password: String,
}

/// Public projection of a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            email_verified_at: user.email_verified_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate()?;

    let user = state
        .auth
        .register(&request.email, &request.password, &request.role)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    request.validate()?;

    let tokens = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    request.validate()?;

    let tokens = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshTokenRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    state.auth.logout(&request.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    state.auth.verify_email(&request.token).await?;
    Ok(MessageResponse::new("email verified successfully"))
}

/// POST /api/v1/auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    state.auth.resend_verification(&request.email).await?;
    Ok(MessageResponse::new("verification email sent"))
}

/// PATCH /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    state
        .auth
        .change_password(&auth, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    state.auth.forgot_password(&request.email).await?;
    Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    state
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(MessageResponse::new("password has been reset successfully"))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth.me(&auth).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_requires_fields() {
        let request = RegisterRequest {
            email: String::new(),
            password: "StrongP@ss1".to_string(),
            role: "admin".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_user_response_omits_digest() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@uwi.edu".to_string(),
            password_digest: "$argon2id$secret".to_string(),
            role: Role::Admin,
            is_active: true,
            email_verified_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["email"], "a@uwi.edu");
        assert_eq!(json["role"], "admin");
        assert!(json["email_verified_at"].is_null());
        assert!(json.get("password_digest").is_none());
    }

    #[test]
    fn test_change_password_request_deserializes_snake_case() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "current_password": "old",
            "new_password": "new"
        }))
        .unwrap();
        assert_eq!(request.current_password, "old");
    }
}
