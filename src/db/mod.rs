//! Database abstraction layer.
//!
//! The executor talks to the database through two traits: a
//! [`ConnectionProvider`] that hands out a fresh [`QueryDriver`] per call,
//! and the driver itself, which runs parameterless SQL and returns a
//! driver-native JSON value that [`normalize_rows`] unwraps.

mod mock;
mod postgres;
mod types;

pub use mock::{MockDriverState, MockProvider};
pub use postgres::PostgresProvider;
pub use types::{normalize_rows, DriverOutput, FieldInfo, QueryResult, Row};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Maximum number of concurrent connections.
pub const MAX_CONNECTIONS: u32 = 5;

/// Idle connections are evicted after this long.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hands out drivers scoped to a single query execution.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Opens a driver. Fails with a configuration error when no connection
    /// string is available.
    async fn acquire(&self) -> Result<Box<dyn QueryDriver>>;
}

/// A connection resource that can run one query and then be released.
#[async_trait]
pub trait QueryDriver: Send + Sync {
    /// Executes a SQL query and returns the driver-native result.
    async fn fetch_json(&self, sql: &str) -> Result<serde_json::Value>;

    /// Releases the underlying connection resource.
    async fn close(&self);
}
