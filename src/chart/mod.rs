//! Chart inference over query results.
//!
//! [`extract_charts`] inspects the shape of a result set and produces zero or
//! more chart descriptors. It never fails: a result with no chartable shape
//! simply yields no charts.

pub mod encoding;
pub mod rules;
pub mod values;

pub use encoding::{append_charts, encode_charts, extract_charts_from_text, CHART_END, CHART_START};
pub use rules::{ColumnProfile, FALLBACK_ROW_LIMIT, PATTERN_RULES};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::db::QueryResult;

/// Kind of chart to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Area,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bar => write!(f, "bar"),
            Self::Line => write!(f, "line"),
            Self::Pie => write!(f, "pie"),
            Self::Area => write!(f, "area"),
        }
    }
}

/// A single labelled value. Extra fields serialize alongside `label` and `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartPoint {
    /// Creates a point without extra fields.
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            extra: Map::new(),
        }
    }

    /// Attaches extra fields.
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Returns true for keys that cannot be used as extra fields.
    pub fn is_reserved_key(key: &str) -> bool {
        key == "label" || key == "value"
    }
}

/// A chart descriptor ready for serialization to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub data: Vec<ChartPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChartData {
    /// Creates an empty chart of the given type.
    pub fn new(chart_type: ChartType, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: Vec::new(),
            x_axis: None,
            y_axis: None,
            description: None,
        }
    }

    pub fn with_x_axis(mut self, axis: impl Into<String>) -> Self {
        self.x_axis = Some(axis.into());
        self
    }

    pub fn with_y_axis(mut self, axis: impl Into<String>) -> Self {
        self.y_axis = Some(axis.into());
        self
    }

    /// Sets both axis titles.
    pub fn with_axes(self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.with_x_axis(x).with_y_axis(y)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_data(mut self, data: Vec<ChartPoint>) -> Self {
        self.data = data;
        self
    }
}

/// Infers charts from a query result.
///
/// Pattern rules run in order and each match contributes one chart; there
/// is no de-duplication. The fallback rule runs only when nothing matched.
pub fn extract_charts(result: &QueryResult) -> Vec<ChartData> {
    if result.rows.is_empty() {
        return Vec::new();
    }

    let profile = ColumnProfile::new(&result.rows);
    let mut charts: Vec<ChartData> = PATTERN_RULES
        .iter()
        .filter_map(|rule| rule(&profile))
        .collect();

    if charts.is_empty() {
        charts.extend(rules::fallback(&profile));
    }

    charts
}
