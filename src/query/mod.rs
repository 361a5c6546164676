//! Query execution and result interpretation.
//!
//! This module isolates bounded SQL execution and advisory insights from the
//! tool layer that serializes them for agents.

pub mod executor;
pub mod insights;

pub use executor::{QueryExecutor, QUERY_TIMEOUT};
pub use insights::generate_insights;
