//! Query result types.
//!
//! Defines the normalized result set handed from the executor to the chart
//! extractor, plus the adapter that unwraps the shapes drivers return.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row keyed by column name. Key order is the column order of the result.
pub type Row = Map<String, Value>;

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Rows of data.
    pub rows: Vec<Row>,

    /// Column metadata, in the key order of the first row.
    pub fields: Vec<FieldInfo>,

    /// Number of rows in the result.
    pub row_count: usize,

    /// Time spent in the query call itself, excluding connect and close.
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result from rows, deriving fields and the row count.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let fields = rows
            .first()
            .map(|row| row.keys().map(FieldInfo::new).collect())
            .unwrap_or_default();
        let row_count = rows.len();

        Self {
            rows,
            fields,
            row_count,
            execution_time_ms: 0,
        }
    }

    /// Sets the execution time in milliseconds.
    pub fn with_execution_time_ms(mut self, millis: u64) -> Self {
        self.execution_time_ms = millis;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in result order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Column name.
    pub name: String,
}

impl FieldInfo {
    /// Creates a new field info with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The result shapes a driver may hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOutput {
    /// A bare array of rows.
    Rows(Vec<Value>),
    /// An object wrapping rows under `data`.
    Data(Vec<Value>),
    /// An object wrapping rows under `rows`.
    Wrapped(Vec<Value>),
    /// Anything else.
    Unknown,
}

impl DriverOutput {
    /// Detects which shape a raw driver value has.
    pub fn detect(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Rows(items),
            Value::Object(mut obj) => {
                if let Some(Value::Array(items)) = obj.remove("data") {
                    Self::Data(items)
                } else if let Some(Value::Array(items)) = obj.remove("rows") {
                    Self::Wrapped(items)
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Unwraps the shape into rows.
    ///
    /// Unknown shapes become an empty list. Elements that are not objects
    /// are dropped.
    pub fn into_rows(self) -> Vec<Row> {
        let items = match self {
            Self::Rows(items) | Self::Data(items) | Self::Wrapped(items) => items,
            Self::Unknown => return Vec::new(),
        };

        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect()
    }
}

/// Normalizes any driver-native result value into rows.
pub fn normalize_rows(value: Value) -> Vec<Row> {
    DriverOutput::detect(value).into_rows()
}
