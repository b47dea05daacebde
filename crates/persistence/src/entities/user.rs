//! User and student entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub role: String,
    pub is_active: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_digest: entity.password_digest,
            // The column is CHECK-constrained; fall back to the least privileged role.
            role: Role::from_str(&entity.role).unwrap_or(Role::Student),
            is_active: entity.is_active,
            email_verified_at: entity.email_verified_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the students table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentEntity {
    pub student_id: i64,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}
