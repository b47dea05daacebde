//! Prometheus instrumentation for the store: per-query latency, transaction
//! outcomes and connection pool gauges.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Times one repository query. Create it before the query runs and call
/// [`QueryTimer::record`] once the result is back, whether it failed or not.
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        histogram!("database_query_duration_seconds", "query" => self.query)
            .record(self.start.elapsed().as_secs_f64());
    }
}

/// Counts a finished transaction by role profile and outcome.
pub fn record_transaction(profile: &'static str, committed: bool, elapsed: Duration) {
    let outcome = if committed { "commit" } else { "rollback" };
    counter!(
        "database_transactions_total",
        "profile" => profile,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("database_transaction_duration_seconds", "profile" => profile)
        .record(elapsed.as_secs_f64());
}

/// Publishes pool occupancy. `max` is the configured ceiling, so
/// `active / max` shows how close the pool is to starving requests.
pub fn record_pool_gauges(pool: &PgPool) {
    let size = pool.size();
    let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX);

    gauge!("database_connections_active").set(f64::from(size.saturating_sub(idle)));
    gauge!("database_connections_idle").set(f64::from(idle));
    gauge!("database_connections_total").set(f64::from(size));
    gauge!("database_connections_max").set(f64::from(pool.options().get_max_connections()));
}
