//! Keeps the connection pool gauges on `/metrics` current.

use sqlx::PgPool;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};

const INTERVAL_SECS: u64 = 10;

pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(INTERVAL_SECS)
    }

    async fn execute(&self) -> anyhow::Result<()> {
        // A closed pool reports zero connections, which would read as idle.
        if self.pool.is_closed() {
            debug!("Pool closed, skipping gauges");
            return Ok(());
        }
        persistence::metrics::record_pool_gauges(&self.pool);
        Ok(())
    }
}
