//! Database metrics.
//!
//! Query durations are recorded per repository method through [`QueryTimer`];
//! pool gauges are refreshed by the health endpoint.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Times one repository query; call [`QueryTimer::record`] after the query
/// resolves to emit the duration.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_bracelet");
/// let result = sqlx::query_as::<_, BraceletEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result.map_err(Into::into)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time under `database_query_duration_seconds`.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

/// Refreshes connection pool gauges from the pool's current state.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_total").set(size as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
}
