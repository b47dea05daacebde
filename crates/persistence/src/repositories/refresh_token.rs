//! Refresh token repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::RefreshTokenEntity;
use crate::metrics::QueryTimer;

/// Repository for refresh token records. Only hashes are stored.
pub struct RefreshTokenRepository;

impl RefreshTokenRepository {
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_refresh_token");
        let result = sqlx::query_as::<_, RefreshTokenEntity>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, revoked_at, replaced_by, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Look up a token by hash, revoked or not, and lock the row for the
    /// rest of the transaction.
    pub async fn find_by_hash_for_update(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_refresh_token_by_hash");
        let result = sqlx::query_as::<_, RefreshTokenEntity>(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked_at, replaced_by, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Revoke one token. Idempotent: an earlier `revoked_at` is kept.
    pub async fn revoke(
        conn: &mut PgConnection,
        id: Uuid,
        replaced_by: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("revoke_refresh_token");
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, NOW()),
                replaced_by = COALESCE(replaced_by, $2)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(replaced_by)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Revoke every live token of a user.
    pub async fn revoke_all_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("revoke_all_refresh_tokens_for_user");
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Count live tokens of a user.
    pub async fn count_active_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_active_refresh_tokens");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM refresh_tokens
            WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Delete tokens that expired before `cutoff`. Successor links pointing
    /// at deleted rows are cleared by the foreign key.
    pub async fn delete_expired_before(
        conn: &mut PgConnection,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_refresh_tokens");
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&mut *conn)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
