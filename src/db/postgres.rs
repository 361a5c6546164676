//! PostgreSQL connection provider.
//!
//! Each [`PostgresProvider::acquire`] call builds a fresh sqlx pool with the
//! crate-wide limits and hands it out as a [`PostgresSession`]. The session
//! is closed by the executor after the query, so no connection outlives a
//! call.

use crate::db::{ConnectionProvider, QueryDriver, CONNECT_TIMEOUT, IDLE_TIMEOUT, MAX_CONNECTIONS};
use crate::error::{AnalystError, Result};
use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, PgValueFormat, PgValueRef};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo, ValueRef};
use tracing::debug;
use url::Url;

/// Hands out per-call Postgres sessions for a connection string.
#[derive(Debug, Clone, Default)]
pub struct PostgresProvider {
    connection_string: Option<String>,
}

impl PostgresProvider {
    /// Creates a provider. A missing connection string is reported on first use.
    pub fn new(connection_string: Option<String>) -> Self {
        Self { connection_string }
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    async fn acquire(&self) -> Result<Box<dyn QueryDriver>> {
        let conn_str = self.connection_string.as_deref().ok_or_else(|| {
            AnalystError::configuration(
                "Database connection string is not configured. Set DATABASE_URL or pass --database-url.",
            )
        })?;

        debug!("Opening connection pool (max {} connections)", MAX_CONNECTIONS);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .idle_timeout(IDLE_TIMEOUT)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(conn_str)
            .await
            .map_err(|e| map_connection_error(e, conn_str))?;

        Ok(Box::new(PostgresSession { pool }))
    }
}

/// A pool handle scoped to one query execution.
#[derive(Debug)]
pub struct PostgresSession {
    pool: PgPool,
}

#[async_trait]
impl QueryDriver for PostgresSession {
    async fn fetch_json(&self, sql: &str) -> Result<Value> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AnalystError::driver(format_query_error(e)))?;

        Ok(Value::Array(rows.iter().map(convert_row).collect()))
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Connection pool closed");
    }
}

/// Converts a sqlx PgRow to a JSON object keyed by column name.
fn convert_row(row: &PgRow) -> Value {
    let mut obj = Map::with_capacity(row.columns().len());
    for (i, col) in row.columns().iter().enumerate() {
        obj.insert(
            col.name().to_string(),
            convert_value(row, i, col.type_info().name()),
        );
    }
    Value::Object(obj)
}

/// Converts a single column value from a PgRow to JSON.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::from(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::from(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .and_then(|v| Number::from_f64(v as f64))
            .map(Value::Number)
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),

        "NUMERIC" | "DECIMAL" => row
            .try_get_raw(index)
            .ok()
            .and_then(decode_numeric)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or(Value::Null),

        "JSON" | "JSONB" => row
            .try_get::<Option<Value>, _>(index)
            .ok()
            .flatten()
            .unwrap_or(Value::Null),

        // For all other types, try to get as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Decodes a Postgres NUMERIC into an f64.
///
/// Binary layout: ndigits, weight, sign, dscale (all 16-bit), then
/// `ndigits` base-10000 digits. NaN and infinities yield `None`.
fn decode_numeric(value: PgValueRef<'_>) -> Option<f64> {
    if value.is_null() {
        return None;
    }

    match value.format() {
        PgValueFormat::Text => value.as_str().ok()?.trim().parse::<f64>().ok(),
        PgValueFormat::Binary => decode_numeric_bytes(value.as_bytes().ok()?),
    }
}

fn decode_numeric_bytes(bytes: &[u8]) -> Option<f64> {
    let read_u16 = |offset: usize| -> Option<u16> {
        bytes
            .get(offset..offset + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
    };

    let ndigits = read_u16(0)? as usize;
    let weight = read_u16(2)? as i16 as i32;
    let sign = read_u16(4)?;

    const SIGN_POS: u16 = 0x0000;
    const SIGN_NEG: u16 = 0x4000;
    if sign != SIGN_POS && sign != SIGN_NEG {
        return None;
    }

    if ndigits == 0 {
        return Some(0.0);
    }

    // Rebuild the decimal text so the parser picks the nearest f64.
    let mut text = String::with_capacity(ndigits * 4 + 8);
    if sign == SIGN_NEG {
        text.push('-');
    }
    for i in 0..ndigits {
        let digit = read_u16(8 + i * 2)?;
        if digit >= 10_000 {
            return None;
        }
        text.push_str(&format!("{digit:04}"));
    }
    let exponent = 4 * (weight - ndigits as i32 + 1);
    text.push_str(&format!("e{exponent}"));

    text.parse::<f64>().ok()
}

/// Maps sqlx connection errors to user-friendly driver errors.
fn map_connection_error(error: sqlx::Error, conn_str: &str) -> AnalystError {
    let (host, port) = Url::parse(conn_str)
        .map(|url| {
            (
                url.host_str().unwrap_or("localhost").to_string(),
                url.port().unwrap_or(5432),
            )
        })
        .unwrap_or_else(|_| ("localhost".to_string(), 5432));

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        AnalystError::driver(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        AnalystError::driver("Authentication failed. Check your credentials.")
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        AnalystError::driver(format!(
            "Connection to {host}:{port} timed out after {} seconds.",
            CONNECT_TIMEOUT.as_secs()
        ))
    } else {
        AnalystError::driver(error.to_string())
    }
}

/// Formats a query error with Postgres detail and hint when available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_bytes(weight: i16, sign: u16, digits: &[u16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(digits.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&sign.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        for d in digits {
            bytes.extend_from_slice(&d.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_decode_numeric_integer() {
        // 12345678 = 1234 * 10000 + 5678
        let bytes = numeric_bytes(1, 0x0000, &[1234, 5678]);
        assert_eq!(decode_numeric_bytes(&bytes), Some(12_345_678.0));
    }

    #[test]
    fn test_decode_numeric_fraction_and_sign() {
        // -12.5 = -(12 + 5000 / 10000)
        let bytes = numeric_bytes(0, 0x4000, &[12, 5000]);
        assert_eq!(decode_numeric_bytes(&bytes), Some(-12.5));
    }

    #[test]
    fn test_decode_numeric_short_fractions_are_nearest_float() {
        // 0.03 = 300 / 10000, 0.12 = 1200 / 10000
        assert_eq!(decode_numeric_bytes(&numeric_bytes(-1, 0x0000, &[300])), Some(0.03));
        assert_eq!(decode_numeric_bytes(&numeric_bytes(-1, 0x0000, &[1200])), Some(0.12));
        // 1234.0567
        assert_eq!(
            decode_numeric_bytes(&numeric_bytes(0, 0x0000, &[1234, 567])),
            Some(1234.0567)
        );
    }

    #[test]
    fn test_decode_numeric_four_digit_fractions() {
        for n in 1..10_000u16 {
            let expected: f64 = format!("0.{n:04}").parse().unwrap();
            assert_eq!(
                decode_numeric_bytes(&numeric_bytes(-1, 0x0000, &[n])),
                Some(expected),
                "0.{n:04}"
            );
        }
    }

    #[test]
    fn test_decode_numeric_rejects_out_of_range_digit() {
        assert_eq!(decode_numeric_bytes(&numeric_bytes(0, 0x0000, &[10_000])), None);
    }

    #[test]
    fn test_decode_numeric_zero_and_nan() {
        assert_eq!(decode_numeric_bytes(&numeric_bytes(0, 0x0000, &[])), Some(0.0));
        assert_eq!(decode_numeric_bytes(&numeric_bytes(0, 0xC000, &[])), None);
        assert_eq!(decode_numeric_bytes(&[0, 1]), None);
    }

    #[tokio::test]
    async fn test_missing_connection_string_is_configuration_error() {
        let provider = PostgresProvider::new(None);
        let err = provider.acquire().await.err().unwrap();
        assert!(matches!(err, AnalystError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_execute_select_against_database() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        let provider = PostgresProvider::new(Some(url));
        let session = provider.acquire().await.unwrap();
        let value = session
            .fetch_json("SELECT 1 AS num, 'hello' AS greeting, 2.5::numeric AS amount")
            .await
            .unwrap();
        session.close().await;

        assert_eq!(value[0]["num"], 1);
        assert_eq!(value[0]["greeting"], "hello");
        assert_eq!(value[0]["amount"], 2.5);
    }
}
