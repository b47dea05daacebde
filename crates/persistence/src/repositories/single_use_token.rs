//! Single-use token repository (email verification, password reset).

use chrono::{DateTime, Utc};
use domain::models::TokenPurpose;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::SingleUseTokenEntity;
use crate::metrics::QueryTimer;

pub struct SingleUseTokenRepository;

impl SingleUseTokenRepository {
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        token_hash: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<SingleUseTokenEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_single_use_token");
        let result = sqlx::query_as::<_, SingleUseTokenEntity>(
            r#"
            INSERT INTO auth_tokens (user_id, token_hash, purpose, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, purpose, expires_at, used_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(purpose.as_str())
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Look up a token of the given purpose and lock the row.
    pub async fn find_by_hash_for_update(
        conn: &mut PgConnection,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<SingleUseTokenEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_single_use_token_by_hash");
        let result = sqlx::query_as::<_, SingleUseTokenEntity>(
            r#"
            SELECT id, user_id, token_hash, purpose, expires_at, used_at, created_at
            FROM auth_tokens
            WHERE token_hash = $1 AND purpose = $2
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .bind(purpose.as_str())
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Mark every unused token of `(user_id, purpose)` as used.
    pub async fn invalidate_all_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("invalidate_single_use_tokens");
        let result = sqlx::query(
            r#"
            UPDATE auth_tokens
            SET used_at = NOW()
            WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Delete tokens that were used or expired before `cutoff`.
    pub async fn delete_stale(
        conn: &mut PgConnection,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_stale_single_use_tokens");
        let result = sqlx::query(
            "DELETE FROM auth_tokens WHERE used_at < $1 OR expires_at < $1",
        )
        .bind(cutoff)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
