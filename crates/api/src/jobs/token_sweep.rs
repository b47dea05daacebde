//! Deletes credential rows that can no longer be used.

use chrono::{Duration, Utc};
use persistence::repositories::{RefreshTokenRepository, SingleUseTokenRepository};
use persistence::TxManager;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

pub struct TokenSweepJob {
    tx: TxManager,
    interval_mins: u64,
}

impl TokenSweepJob {
    pub fn new(tx: TxManager, interval_mins: u64) -> Self {
        Self { tx, interval_mins }
    }
}

#[async_trait::async_trait]
impl Job for TokenSweepJob {
    fn name(&self) -> &'static str {
        "token_sweep"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_mins.max(1))
    }

    async fn execute(&self) -> anyhow::Result<()> {
        // Rows are kept for a day after they stop being usable, so a late
        // replay is still reported as reuse or as an already-used token.
        let cutoff = Utc::now() - Duration::days(1);
        let (refresh_deleted, single_use_deleted) = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let refresh =
                        RefreshTokenRepository::delete_expired_before(conn, cutoff).await?;
                    let single_use = SingleUseTokenRepository::delete_stale(conn, cutoff).await?;
                    Ok::<_, sqlx::Error>((refresh, single_use))
                })
            })
            .await?;

        info!(
            refresh_tokens = refresh_deleted,
            single_use_tokens = single_use_deleted,
            "Swept stale tokens"
        );
        Ok(())
    }
}
