//! The `run_query` tool exposed to analyst agents.
//!
//! Combines validation, execution, chart inference and insights into one
//! serializable response. Failures become a response with an error message
//! and remediation hints instead of an `Err`, since the caller feeds the
//! response straight back to the model.

mod trace;

pub use trace::{ToolCallRecord, ToolTrace};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::{extract_charts, ChartData};
use crate::db::{FieldInfo, Row};
use crate::error::AnalystError;
use crate::query::{generate_insights, QueryExecutor};

/// Name under which the tool is registered with the model.
pub const RUN_QUERY_TOOL: &str = "run_query";

/// Tool definition for LLM function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Input parameters for the run_query tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunQueryInput {
    pub sql: String,
}

/// Response of the run_query tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunQueryResponse {
    Success(QuerySuccess),
    Failure(QueryFailure),
}

/// Successful run_query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySuccess {
    pub success: bool,
    pub row_count: usize,
    pub execution_time_ms: u64,
    pub rows: Vec<Row>,
    pub fields: Vec<FieldInfo>,
    pub chart_data: Vec<ChartData>,
    pub insights: Vec<String>,
}

/// Failed run_query payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub success: bool,
    pub error: String,
    pub suggestions: Vec<String>,
}

impl RunQueryResponse {
    /// Builds a failure response with suggestions matching the error.
    pub fn failure(error: &AnalystError) -> Self {
        Self::Failure(QueryFailure {
            success: false,
            error: error.to_string(),
            suggestions: suggestions_for(error),
        })
    }

    /// Returns true for a successful response.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Charts carried by the response; empty for failures.
    pub fn charts(&self) -> &[ChartData] {
        match self {
            Self::Success(success) => &success.chart_data,
            Self::Failure(_) => &[],
        }
    }
}

/// Returns the tool definitions available to the model.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: RUN_QUERY_TOOL.to_string(),
        description: "Run a read-only SQL SELECT query (optionally with a WITH clause) against \
                      the Postgres database. Returns rows, column names, timing, chart data \
                      inferred from the result shape, and observations about the result."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "A single SELECT statement. Data-modifying statements are rejected."
                }
            },
            "required": ["sql"]
        }),
    }]
}

/// Runs a query and packages the outcome for the model.
pub async fn run_query(executor: &QueryExecutor, sql: &str) -> RunQueryResponse {
    match executor.execute(sql).await {
        Ok(result) => {
            let chart_data = extract_charts(&result);
            let insights = generate_insights(&result);
            info!(
                "run_query succeeded: {} rows, {} charts",
                result.row_count,
                chart_data.len()
            );

            RunQueryResponse::Success(QuerySuccess {
                success: true,
                row_count: result.row_count,
                execution_time_ms: result.execution_time_ms,
                rows: result.rows,
                fields: result.fields,
                chart_data,
                insights,
            })
        }
        Err(e) => {
            warn!("run_query failed: {}", e);
            RunQueryResponse::failure(&e)
        }
    }
}

/// Dispatches a model tool call by name with JSON arguments.
pub async fn dispatch_tool_call(
    executor: &QueryExecutor,
    name: &str,
    arguments: serde_json::Value,
) -> RunQueryResponse {
    if name != RUN_QUERY_TOOL {
        return RunQueryResponse::failure(&AnalystError::internal(format!(
            "Unknown tool: {name}"
        )));
    }

    match serde_json::from_value::<RunQueryInput>(arguments) {
        Ok(input) => run_query(executor, &input.sql).await,
        Err(e) => RunQueryResponse::failure(&AnalystError::validation(format!(
            "Invalid arguments for {RUN_QUERY_TOOL}: {e}"
        ))),
    }
}

/// Remediation hints for a failed query.
pub fn suggestions_for(error: &AnalystError) -> Vec<String> {
    let hints: &[&str] = match error {
        AnalystError::Timeout(_) => &[
            "Simplify the query or add filters to reduce the amount of data scanned",
            "Aggregate in SQL instead of returning raw rows",
            "Add a LIMIT clause while exploring",
        ],
        AnalystError::Validation(_) => &[
            "Rewrite the request as a single read-only SELECT statement",
            "Avoid data-modifying keywords, even inside identifiers or string literals",
        ],
        AnalystError::Configuration(_) => &["Set DATABASE_URL to a Postgres connection string"],
        _ => &[
            "Check table and column names for typos",
            "Verify that the referenced tables exist",
            "Check that JOIN conditions reference the right columns",
            "Check that WHERE clause values match the column types",
        ],
    };

    hints.iter().map(|h| h.to_string()).collect()
}
