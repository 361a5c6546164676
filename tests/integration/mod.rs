//! Integration tests for the analyst core.

pub mod pipeline_test;
pub mod postgres_test;
