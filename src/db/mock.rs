//! Mock connection provider for testing.
//!
//! Returns a canned driver result, optionally after a delay, and records how
//! drivers were acquired and released so tests can check resource handling.

use super::{ConnectionProvider, QueryDriver};
use crate::error::{AnalystError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters shared between a mock provider and the drivers it hands out.
#[derive(Debug, Default)]
pub struct MockDriverState {
    acquired: AtomicUsize,
    closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    queries: std::sync::Mutex<Vec<String>>,
}

impl MockDriverState {
    /// Number of drivers handed out.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Number of drivers released.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Highest number of drivers open at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// SQL strings the drivers were asked to run, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

/// A mock provider that returns predefined results.
#[derive(Clone)]
pub struct MockProvider {
    response: std::result::Result<Value, String>,
    delay: Option<Duration>,
    state: Arc<MockDriverState>,
}

impl MockProvider {
    /// Creates a provider whose drivers return the given raw value.
    pub fn returning(value: Value) -> Self {
        Self {
            response: Ok(value),
            delay: None,
            state: Arc::new(MockDriverState::default()),
        }
    }

    /// Creates a provider whose drivers fail with the given driver message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            delay: None,
            state: Arc::new(MockDriverState::default()),
        }
    }

    /// Delays every query by the given duration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the shared counters.
    pub fn state(&self) -> Arc<MockDriverState> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn acquire(&self) -> Result<Box<dyn QueryDriver>> {
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(MockDriver {
            response: self.response.clone(),
            delay: self.delay,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockDriver {
    response: std::result::Result<Value, String>,
    delay: Option<Duration>,
    state: Arc<MockDriverState>,
}

#[async_trait]
impl QueryDriver for MockDriver {
    async fn fetch_json(&self, sql: &str) -> Result<Value> {
        if let Ok(mut queries) = self.state.queries.lock() {
            queries.push(sql.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.response.clone().map_err(AnalystError::driver)
    }

    async fn close(&self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}
