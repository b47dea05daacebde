//! Refresh and single-use token entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::TokenPurpose;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the refresh_tokens table.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<RefreshTokenEntity> for domain::models::RefreshToken {
    fn from(entity: RefreshTokenEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            token_hash: entity.token_hash,
            expires_at: entity.expires_at,
            revoked_at: entity.revoked_at,
            replaced_by: entity.replaced_by,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the auth_tokens table.
#[derive(Debug, Clone, FromRow)]
pub struct SingleUseTokenEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<SingleUseTokenEntity> for domain::models::SingleUseToken {
    fn from(entity: SingleUseTokenEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            token_hash: entity.token_hash,
            purpose: TokenPurpose::from_str(&entity.purpose).unwrap_or(TokenPurpose::VerifyEmail),
            expires_at: entity.expires_at,
            used_at: entity.used_at,
            created_at: entity.created_at,
        }
    }
}
