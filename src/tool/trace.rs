//! Accumulation of tool calls across agent steps.
//!
//! An agent may call `run_query` several times in one turn. Instead of a
//! shared mutable list, each step takes the trace, appends to it and hands
//! it on; the final trace yields every call and the charts they produced.

use serde::{Deserialize, Serialize};

use super::{dispatch_tool_call, RunQueryResponse};
use crate::chart::{append_charts, ChartData};
use crate::error::Result;
use crate::query::QueryExecutor;

/// One tool invocation and its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub response: RunQueryResponse,
}

/// Ordered record of tool calls made during one agent turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolTrace {
    calls: Vec<ToolCallRecord>,
}

impl ToolTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished call.
    pub fn record(mut self, record: ToolCallRecord) -> Self {
        self.calls.push(record);
        self
    }

    /// Runs one tool call and returns the trace with the call appended.
    pub async fn step(
        self,
        executor: &QueryExecutor,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Self {
        let response = dispatch_tool_call(executor, tool_name, arguments.clone()).await;
        self.record(ToolCallRecord {
            tool_name: tool_name.to_string(),
            arguments,
            response,
        })
    }

    pub fn calls(&self) -> &[ToolCallRecord] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Charts from all successful calls, in call order.
    pub fn charts(&self) -> Vec<ChartData> {
        self.calls
            .iter()
            .flat_map(|call| call.response.charts().iter().cloned())
            .collect()
    }

    /// Appends every collected chart to the narrative as one marker block.
    pub fn finish(&self, narrative: &str) -> Result<String> {
        append_charts(narrative, &self.charts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::extract_charts_from_text;
    use crate::db::MockProvider;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_steps_accumulate_in_order() {
        let executor = QueryExecutor::new(Arc::new(MockProvider::returning(json!([
            {"region": "EU", "total": 3},
            {"region": "US", "total": 5}
        ]))));

        let trace = ToolTrace::new()
            .step(&executor, "run_query", json!({"sql": "SELECT region, total FROM sales"}))
            .await
            .step(&executor, "run_query", json!({"sql": "DROP TABLE sales"}))
            .await
            .step(&executor, "run_query", json!({"sql": "SELECT region, total FROM sales"}))
            .await;

        assert_eq!(trace.len(), 3);
        assert!(trace.calls()[0].response.is_success());
        assert!(!trace.calls()[1].response.is_success());
        assert_eq!(trace.charts().len(), 2);

        let text = trace.finish("Sales by region.").unwrap();
        let (narrative, charts) = extract_charts_from_text(&text).unwrap();
        assert_eq!(narrative, "Sales by region.");
        assert_eq!(charts, trace.charts());
    }

    #[test]
    fn test_empty_trace_finishes_with_plain_narrative() {
        let trace = ToolTrace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.finish("No data needed.").unwrap(), "No data needed.");
    }
}
