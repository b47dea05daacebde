//! Transactional execution layer.
//!
//! Every database-touching operation runs inside exactly one transaction
//! acquired here. The session assumes one of two role profiles before the
//! body runs:
//!
//! - `internal` for system writes, unrestricted by row-level policies.
//! - `authenticated` for reads on behalf of a caller. The caller's identity is
//!   installed as `app.current_user_id`, `app.current_student_id` and
//!   `app.current_role`, which the row-level policies read.
//!
//! The body's future is boxed so it can borrow the connection for the
//! lifetime of the transaction:
//!
//! ```ignore
//! let user = tx.run_system(move |conn| Box::pin(async move {
//!     UserRepository::find_by_email(conn, &email).await
//! })).await?;
//! ```

use domain::models::AuthContext;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

/// Boxed future borrowing the transaction's connection.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Session role profile assumed by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleProfile {
    Internal,
    Authenticated,
}

impl RoleProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleProfile::Internal => "internal",
            RoleProfile::Authenticated => "authenticated",
        }
    }

    fn set_role_statement(&self) -> &'static str {
        match self {
            RoleProfile::Internal => "SET LOCAL ROLE internal",
            RoleProfile::Authenticated => "SET LOCAL ROLE authenticated",
        }
    }
}

/// Opens scoped transactions on the shared pool.
#[derive(Clone)]
pub struct TxManager {
    pool: PgPool,
}

impl TxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `body` with the `internal` profile.
    pub async fn run_system<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>> + Send,
        T: Send,
        E: From<sqlx::Error> + Send,
    {
        let mut tx = self.pool.begin().await?;
        sqlx::query(RoleProfile::Internal.set_role_statement())
            .execute(&mut *tx)
            .await?;

        finish(tx, RoleProfile::Internal, body).await
    }

    /// Runs `body` with the `authenticated` profile and the caller's
    /// identity installed as transaction-local session variables.
    pub async fn run_authenticated<T, E, F>(&self, auth: &AuthContext, body: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>> + Send,
        T: Send,
        E: From<sqlx::Error> + Send,
    {
        let mut tx = self.pool.begin().await?;
        sqlx::query(RoleProfile::Authenticated.set_role_statement())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            SELECT set_config('app.current_user_id', $1, true),
                   set_config('app.current_student_id', $2, true),
                   set_config('app.current_role', $3, true)
            "#,
        )
        .bind(auth.user_id.to_string())
        .bind(auth.student_id.clone().unwrap_or_default())
        .bind(auth.role.as_str())
        .execute(&mut *tx)
        .await?;

        finish(tx, RoleProfile::Authenticated, body).await
    }
}

/// Commits on success, rolls back on error. A panicking body drops the
/// transaction, which rolls it back.
async fn finish<T, E, F>(
    mut tx: Transaction<'static, Postgres>,
    profile: RoleProfile,
    body: F,
) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>> + Send,
    E: From<sqlx::Error>,
{
    let start = Instant::now();
    let result = body(&mut *tx).await;

    let outcome = match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    profile = profile.as_str(),
                    error = %rollback_err,
                    "Failed to roll back transaction"
                );
            }
            Err(err)
        }
    };

    crate::metrics::record_transaction(profile.as_str(), outcome.is_ok(), start.elapsed());

    outcome
}
