//! Query execution tests against a real Postgres.
//!
//! Skipped unless DATABASE_URL is set.

use sql_analyst::chart::{extract_charts, ChartType};
use sql_analyst::error::AnalystError;
use sql_analyst::query::QueryExecutor;

/// Helper to create a test executor.
fn get_test_executor() -> Option<QueryExecutor> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(QueryExecutor::postgres(Some(url)))
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(executor) = get_test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .execute("SELECT 1 AS num, 'hello' AS greeting")
        .await
        .unwrap();

    assert_eq!(result.field_names(), vec!["num", "greeting"]);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0]["num"], 1);
}

#[tokio::test]
async fn test_generated_series_charts() {
    let Some(executor) = get_test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .execute(
            "SELECT d::date AS day, (random() * 100)::int AS visits \
             FROM generate_series('2024-01-01'::date, '2024-01-07'::date, interval '1 day') AS d",
        )
        .await
        .unwrap();
    let charts = extract_charts(&result);

    assert_eq!(result.row_count, 7);
    assert!(charts.iter().any(|c| c.chart_type == ChartType::Line));
    assert!(charts.iter().all(|c| c.data.len() == 7));
}

#[tokio::test]
async fn test_missing_table_is_driver_error() {
    let Some(executor) = get_test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = executor
        .execute("SELECT * FROM nonexistent_table_xyz")
        .await
        .unwrap_err();

    assert!(matches!(err, AnalystError::Driver(_)));
    assert!(err.to_string().contains("nonexistent_table_xyz"));
}
