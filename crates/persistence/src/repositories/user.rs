//! User repository for database operations.

use domain::models::{Role, User};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::{StudentEntity, UserEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str =
    "id, email, password_digest, role, is_active, email_verified_at, created_at, updated_at";

/// Repository for user and student lookups.
pub struct UserRepository;

impl UserRepository {
    /// Insert a new account. Fails with a unique violation when the email exists.
    pub async fn create(
        conn: &mut PgConnection,
        email: &str,
        password_digest: &str,
        role: Role,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_digest, role, is_active)
            VALUES ($1, $2, $3, true)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_digest)
        .bind(role.as_str())
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Find a user by ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Find a user by email. The comparison is exact; callers normalize.
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Write every mutable field of `user`.
    pub async fn update(
        conn: &mut PgConnection,
        user: &User,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET email = $2, password_digest = $3, role = $4, is_active = $5,
                email_verified_at = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_digest)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.email_verified_at)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Find the registry record linked to a student email.
    pub async fn find_student_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_student_by_email");
        let result = sqlx::query_as::<_, StudentEntity>(
            r#"
            SELECT student_id, email_address, first_name, last_name, created_at
            FROM students
            WHERE email_address = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }
}
