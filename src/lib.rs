//! SQL analyst core: safe execution of LLM-authored SQL with chart extraction.
//!
//! The pipeline is validate ([`safety`]) → execute under limits
//! ([`query`]) → infer charts ([`chart`]). The [`tool`] module packages that
//! pipeline as the `run_query` tool handed to analyst agents.

pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod safety;
pub mod tool;
