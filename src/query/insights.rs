//! Advisory observations about a query result, used for narrative text.

use crate::db::QueryResult;

const LARGE_RESULT_ROWS: usize = 1000;
const SLOW_QUERY_MS: u64 = 5000;
const FAST_QUERY_MS: u64 = 100;
const WIDE_RESULT_COLUMNS: usize = 20;

/// Produces human-readable observations about a result.
pub fn generate_insights(result: &QueryResult) -> Vec<String> {
    let mut insights = Vec::new();

    if result.row_count == 0 {
        insights.push(
            "The query returned no rows. The filters may be too narrow or the tables may be empty."
                .to_string(),
        );
    } else if result.row_count > LARGE_RESULT_ROWS {
        insights.push(format!(
            "Large result set ({} rows). Consider adding filters or aggregating.",
            result.row_count
        ));
    }

    if result.execution_time_ms > SLOW_QUERY_MS {
        insights.push(format!(
            "Query was slow ({} ms). Indexes or a narrower query may help.",
            result.execution_time_ms
        ));
    } else if result.execution_time_ms < FAST_QUERY_MS {
        insights.push(format!(
            "Query executed quickly ({} ms).",
            result.execution_time_ms
        ));
    }

    if result.fields.len() > WIDE_RESULT_COLUMNS {
        insights.push(format!(
            "Wide result ({} columns). Selecting only the needed columns keeps it readable.",
            result.fields.len()
        ));
    }

    if let Some(first) = result.rows.first() {
        let null_columns: Vec<&str> = first
            .iter()
            .filter(|(_, value)| value.is_null())
            .map(|(name, _)| name.as_str())
            .collect();

        if !null_columns.is_empty() {
            insights.push(format!(
                "Columns with null values in the first row: {}",
                null_columns.join(", ")
            ));
        }
    }

    insights
}
