//! Bounded, timed execution of validated queries.
//!
//! The executor validates first, waits for a connection slot, opens a driver,
//! races the query against a fixed timeout, and releases the driver on every
//! exit path before interpreting the outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::db::{normalize_rows, ConnectionProvider, PostgresProvider, QueryResult, MAX_CONNECTIONS};
use crate::error::{AnalystError, Result};
use crate::safety::validate_query;

/// Wall-clock bound on a single query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Query executor that handles validation, resource limits and normalization.
#[derive(Clone)]
pub struct QueryExecutor {
    provider: Arc<dyn ConnectionProvider>,
    slots: Arc<Semaphore>,
}

impl QueryExecutor {
    /// Creates an executor over the given provider, capped at
    /// [`MAX_CONNECTIONS`] concurrent executions.
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            slots: Arc::new(Semaphore::new(MAX_CONNECTIONS as usize)),
        }
    }

    /// Creates an executor backed by Postgres.
    pub fn postgres(connection_string: Option<String>) -> Self {
        Self::new(Arc::new(PostgresProvider::new(connection_string)))
    }

    /// Validates and executes a query.
    ///
    /// Callers beyond the connection cap wait for a free slot rather than
    /// being rejected.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult> {
        if let Err(e) = validate_query(sql).into_result() {
            warn!("Rejected query: {}", e.message());
            return Err(e);
        }
        let sql = sql.trim();

        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| AnalystError::internal("Connection limiter was closed"))?;

        let driver = self.provider.acquire().await?;

        let start = Instant::now();
        let outcome = tokio::time::timeout(QUERY_TIMEOUT, driver.fetch_json(sql)).await;
        let execution_time = start.elapsed();

        driver.close().await;

        let raw = match outcome {
            Ok(result) => result?,
            Err(_) => {
                warn!("Query timed out after {:?}", execution_time);
                return Err(AnalystError::timeout(format!(
                    "Query timed out after {} seconds",
                    QUERY_TIMEOUT.as_secs()
                )));
            }
        };

        let rows = normalize_rows(raw);
        let result =
            QueryResult::from_rows(rows).with_execution_time_ms(execution_time.as_millis() as u64);

        info!(
            "Query returned {} rows in {} ms",
            result.row_count, result.execution_time_ms
        );
        debug!("Fields: {:?}", result.field_names());

        Ok(result)
    }
}
