//! End-to-end pipeline tests: validate → execute → chart → encode.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sql_analyst::chart::{
    append_charts, extract_charts, extract_charts_from_text, ChartPoint, ChartType,
};
use sql_analyst::db::{MockProvider, MAX_CONNECTIONS};
use sql_analyst::error::AnalystError;
use sql_analyst::query::{QueryExecutor, QUERY_TIMEOUT};
use sql_analyst::safety::validate_query;
use sql_analyst::tool::{run_query, RunQueryResponse, ToolTrace};

fn executor(provider: &MockProvider) -> QueryExecutor {
    QueryExecutor::new(Arc::new(provider.clone()))
}

#[test]
fn test_validator_properties() {
    assert!(validate_query("SELECT * FROM accounts").is_valid);

    let drop = validate_query("DROP TABLE accounts");
    assert!(!drop.is_valid);
    assert!(drop.error.unwrap().contains("drop"));

    let cte = validate_query("  WITH t AS (VALUES (1)) TABLE t");
    assert!(!cte.is_valid);
    assert!(cte.error.unwrap().contains("CTE"));

    for sql in ["select 1; Grant all on t to x", "SELECT 'ReNaMe'"] {
        assert!(!validate_query(sql).is_valid, "{sql}");
    }
}

#[tokio::test]
async fn test_account_balances_chart() {
    let provider = MockProvider::returning(json!({
        "data": [
            {"account_name": "Checking", "balance": 1200.5},
            {"account_name": "Savings", "balance": 8000},
            {"account_name": "Brokerage", "balance": 15250.75}
        ]
    }));

    let result = executor(&provider)
        .execute("SELECT account_name, balance FROM accounts")
        .await
        .unwrap();
    let charts = extract_charts(&result);

    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].chart_type, ChartType::Bar);
    assert_eq!(charts[0].x_axis.as_deref(), Some("account_name"));
    assert_eq!(charts[0].y_axis.as_deref(), Some("balance"));
    assert_eq!(
        charts[0].data,
        vec![
            ChartPoint::new("Checking", 1200.5),
            ChartPoint::new("Savings", 8000.0),
            ChartPoint::new("Brokerage", 15250.75),
        ]
    );
}

#[tokio::test]
async fn test_revenue_and_cost_are_summed() {
    let provider = MockProvider::returning(json!([
        {"month": "Jan", "revenue": 100, "cost": 30},
        {"month": "Feb", "revenue": 120, "cost": 45},
        {"month": "Mar", "revenue": 90, "cost": 60}
    ]));

    let result = executor(&provider)
        .execute("SELECT month, revenue, cost FROM monthly_totals")
        .await
        .unwrap();
    let charts = extract_charts(&result);

    let values: Vec<f64> = charts[0].data.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![130.0, 165.0, 150.0]);
}

#[tokio::test]
async fn test_time_series_response_round_trips_through_text() {
    let provider = MockProvider::returning(json!([
        {"created_at": "2024-05-01 09:00:00", "amount": 12},
        {"created_at": "2024-05-02 09:00:00", "amount": 18}
    ]));

    let response = run_query(&executor(&provider), "SELECT * FROM payments").await;
    let RunQueryResponse::Success(success) = &response else {
        panic!("Expected success");
    };

    let line = success
        .chart_data
        .iter()
        .find(|c| c.chart_type == ChartType::Line)
        .expect("line chart");
    assert_eq!(line.x_axis.as_deref(), Some("created_at"));

    let text = append_charts("Payments grew.", &success.chart_data).unwrap();
    let (narrative, decoded) = extract_charts_from_text(&text).unwrap();
    assert_eq!(narrative, "Payments grew.");
    assert_eq!(decoded, success.chart_data);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_and_releases() {
    let provider = MockProvider::returning(json!([])).with_delay(QUERY_TIMEOUT * 2);

    let err = executor(&provider)
        .execute("SELECT * FROM huge_table")
        .await
        .unwrap_err();

    assert!(matches!(err, AnalystError::Timeout(_)));
    assert!(err.to_string().contains("30 seconds"));
    assert_eq!(provider.state().closed(), 1);
}

#[tokio::test]
async fn test_concurrent_executions_respect_connection_cap() {
    let provider =
        MockProvider::returning(json!([{"n": 1}])).with_delay(Duration::from_millis(50));
    let executor = executor(&provider);

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move { executor.execute(&format!("SELECT {i} AS n")).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let state = provider.state();
    assert_eq!(state.acquired(), 12);
    assert_eq!(state.closed(), 12);
    assert!(state.max_in_flight() <= MAX_CONNECTIONS as usize);
}

#[tokio::test]
async fn test_trace_collects_charts_across_steps() {
    let provider = MockProvider::returning(json!([
        {"region": "EU", "orders": 4},
        {"region": "US", "orders": 9}
    ]));
    let executor = executor(&provider);

    let trace = ToolTrace::new()
        .step(&executor, "run_query", json!({"sql": "SELECT region, orders FROM o"}))
        .await
        .step(&executor, "run_query", json!({"sql": "UPDATE o SET orders = 0"}))
        .await;

    assert_eq!(trace.len(), 2);
    assert_eq!(trace.charts().len(), 1);

    let failure: Value = serde_json::to_value(&trace.calls()[1].response).unwrap();
    assert_eq!(failure["success"], false);
    assert!(failure["error"].as_str().unwrap().contains("update"));
}
