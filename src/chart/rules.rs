//! Structural pattern rules that turn a result set into charts.
//!
//! Each rule is an independent predicate+transform over a [`ColumnProfile`].
//! [`PATTERN_RULES`] run in order and every match contributes a chart; the
//! [`fallback`] rule only runs when none of them matched.

use serde_json::{Map, Value};

use super::values::{is_numeric, is_temporal, to_label, to_number};
use super::{ChartData, ChartPoint, ChartType};
use crate::db::Row;

/// Maximum points emitted by the fallback rule.
pub const FALLBACK_ROW_LIMIT: usize = 20;

/// A chart pattern: returns a chart when the result has the right shape.
pub type ChartRule = fn(&ColumnProfile<'_>) -> Option<ChartData>;

/// Pattern rules in evaluation order.
pub const PATTERN_RULES: &[ChartRule] = &[two_column, multi_series, time_series];

/// Column classification of a non-empty result set.
#[derive(Debug)]
pub struct ColumnProfile<'a> {
    rows: &'a [Row],
    columns: Vec<Column<'a>>,
}

#[derive(Debug)]
struct Column<'a> {
    name: &'a str,
    numeric: bool,
    temporal: bool,
}

impl<'a> ColumnProfile<'a> {
    /// Classifies the columns of `rows`, using the key order of the first row.
    pub fn new(rows: &'a [Row]) -> Self {
        let columns = rows
            .first()
            .map(|first| {
                first
                    .keys()
                    .map(|name| Column {
                        name: name.as_str(),
                        numeric: rows.iter().all(|row| cell(row, name).is_some_and(is_numeric)),
                        temporal: rows.iter().any(|row| cell(row, name).is_some_and(is_temporal)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { rows, columns }
    }

    /// Rows being profiled.
    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    /// All column names in result order.
    pub fn field_names(&self) -> Vec<&'a str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Columns whose every value is numeric.
    pub fn numeric_fields(&self) -> Vec<&'a str> {
        self.columns.iter().filter(|c| c.numeric).map(|c| c.name).collect()
    }

    /// Columns with at least one non-numeric value.
    pub fn non_numeric_fields(&self) -> Vec<&'a str> {
        self.columns.iter().filter(|c| !c.numeric).map(|c| c.name).collect()
    }

    /// Columns with at least one date-like value.
    pub fn time_fields(&self) -> Vec<&'a str> {
        self.columns.iter().filter(|c| c.temporal).map(|c| c.name).collect()
    }

    fn is_numeric(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name && c.numeric)
    }
}

fn cell<'r>(row: &'r Row, name: &str) -> Option<&'r Value> {
    row.get(name)
}

/// Builds a label/value point for each row.
fn label_value_points(rows: &[Row], label_field: &str, value_field: &str) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| {
            ChartPoint::new(
                cell(row, label_field).map(to_label).unwrap_or_default(),
                cell(row, value_field).map(to_number).unwrap_or(0.0),
            )
        })
        .collect()
}

fn category_bar(rows: &[Row], label_field: &str, value_field: &str, title: String) -> ChartData {
    ChartData::new(ChartType::Bar, title)
        .with_axes(label_field, value_field)
        .with_description(format!(
            "Distribution of {value_field} across different {label_field} values"
        ))
        .with_data(label_value_points(rows, label_field, value_field))
}

/// Two columns, one categorical and one numeric: a bar per row.
pub fn two_column(profile: &ColumnProfile<'_>) -> Option<ChartData> {
    let [first, second] = profile.field_names()[..] else {
        return None;
    };

    let (label_field, value_field) = match (profile.is_numeric(first), profile.is_numeric(second)) {
        (false, true) => (first, second),
        (true, false) => (second, first),
        _ => return None,
    };

    Some(category_bar(
        profile.rows(),
        label_field,
        value_field,
        format!("{value_field} by {label_field}"),
    ))
}

/// One label column and several numeric columns.
///
/// The series are summed into a single bar per label. Individual series
/// values ride along as extra point fields.
pub fn multi_series(profile: &ColumnProfile<'_>) -> Option<ChartData> {
    let numeric_fields = profile.numeric_fields();
    let [label_field] = profile.non_numeric_fields()[..] else {
        return None;
    };
    if numeric_fields.len() < 2 {
        return None;
    }

    let data = profile
        .rows()
        .iter()
        .map(|row| {
            let mut extra = Map::new();
            let mut total = 0.0;
            for field in &numeric_fields {
                let value = cell(row, field).map(to_number).unwrap_or(0.0);
                total += value;
                if !ChartPoint::is_reserved_key(field) {
                    extra.insert(field.to_string(), Value::from(value));
                }
            }
            // Overflowing totals follow the same zero fallback as bad values
            if !total.is_finite() {
                total = 0.0;
            }
            ChartPoint::new(cell(row, label_field).map(to_label).unwrap_or_default(), total)
                .with_extra(extra)
        })
        .collect();

    Some(
        ChartData::new(
            ChartType::Bar,
            format!("Multi-series Analysis by {label_field}"),
        )
        .with_x_axis(label_field)
        .with_y_axis("Values")
        .with_description(format!(
            "Combined values of {} by {label_field}",
            numeric_fields.join(", ")
        ))
        .with_data(data),
    )
}

/// First date-like column against the first numeric column.
pub fn time_series(profile: &ColumnProfile<'_>) -> Option<ChartData> {
    let time_field = *profile.time_fields().first()?;
    let value_field = *profile.numeric_fields().first()?;

    Some(
        ChartData::new(ChartType::Line, format!("{value_field} Over Time"))
            .with_axes(time_field, value_field)
            .with_description(format!("Trend of {value_field} over {time_field}"))
            .with_data(label_value_points(profile.rows(), time_field, value_field)),
    )
}

/// Last-resort chart over the first rows when no pattern matched.
pub fn fallback(profile: &ColumnProfile<'_>) -> Option<ChartData> {
    let fields = profile.field_names();
    if profile.rows().is_empty() || fields.len() < 2 {
        return None;
    }

    let numeric_field = fields.iter().copied().find(|f| profile.is_numeric(f))?;
    let label_field = fields.iter().copied().find(|f| !profile.is_numeric(f));
    let rows = &profile.rows()[..profile.rows().len().min(FALLBACK_ROW_LIMIT)];

    let chart = match label_field {
        Some(label_field) => category_bar(
            rows,
            label_field,
            numeric_field,
            format!("Data Analysis: {numeric_field} by {label_field}"),
        ),
        None => ChartData::new(ChartType::Bar, format!("{numeric_field} Distribution"))
            .with_axes("Row", numeric_field)
            .with_description(format!("Values of {numeric_field} by row position"))
            .with_data(
                rows.iter()
                    .enumerate()
                    .map(|(i, row)| {
                        ChartPoint::new(
                            format!("Row {}", i + 1),
                            cell(row, numeric_field).map(to_number).unwrap_or(0.0),
                        )
                    })
                    .collect(),
            ),
    };

    Some(chart)
}
