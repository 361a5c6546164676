//! Loose value coercions used by the chart heuristics.
//!
//! Result rows arrive as untyped JSON, so numbers may be encoded as strings
//! and dates are always strings. These helpers decide what a cell "looks
//! like" without knowing the column's database type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATETIME_TZ_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses text as a finite number. Blank text counts as zero.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns true if the value is a number or text holding a finite number.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => parse_number(s).is_some(),
        _ => false,
    }
}

/// Coerces a value to a chart value, falling back to zero.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_number(s).unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Renders a value as a chart label. Null becomes the empty string.
pub fn to_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                Some(f) => f.to_string(),
                None => n.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// Returns true if the value is text that parses as a date or timestamp.
///
/// Numbers are never treated as dates.
pub fn is_temporal(value: &Value) -> bool {
    let Value::String(s) = value else {
        return false;
    };
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
        return true;
    }

    if DATETIME_TZ_FORMATS
        .iter()
        .any(|fmt| DateTime::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }

    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }

    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }

    // Year-month, e.g. "2024-03"
    s.len() == 7 && NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&json!(42)));
        assert!(is_numeric(&json!(-1.5)));
        assert!(is_numeric(&json!("3.25")));
        assert!(is_numeric(&json!(" 7 ")));
        assert!(is_numeric(&json!("")));
        assert!(!is_numeric(&json!("abc")));
        assert!(!is_numeric(&json!("NaN")));
        assert!(!is_numeric(&json!("inf")));
        assert!(!is_numeric(&Value::Null));
        assert!(!is_numeric(&json!(true)));
        assert!(!is_numeric(&json!([1])));
    }

    #[test]
    fn test_to_number_falls_back_to_zero() {
        assert_eq!(to_number(&json!(12)), 12.0);
        assert_eq!(to_number(&json!("12.5")), 12.5);
        assert_eq!(to_number(&json!("n/a")), 0.0);
        assert_eq!(to_number(&Value::Null), 0.0);
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(to_number(&json!(false)), 0.0);
    }

    #[test]
    fn test_to_label() {
        assert_eq!(to_label(&Value::Null), "");
        assert_eq!(to_label(&json!("Checking")), "Checking");
        assert_eq!(to_label(&json!(3)), "3");
        assert_eq!(to_label(&json!(3.0)), "3");
        assert_eq!(to_label(&json!(2.5)), "2.5");
        assert_eq!(to_label(&json!(false)), "false");
    }

    #[test]
    fn test_is_temporal_formats() {
        for text in [
            "2024-03-01",
            "2024/03/01",
            "2024-03",
            "2024-03-01 10:15:00",
            "2024-03-01T10:15:00.123",
            "2024-03-01T10:15:00Z",
            "2024-03-01T10:15:00+02:00",
            "2024-03-01 10:15:00+00",
            "Fri, 01 Mar 2024 10:15:00 +0000",
        ] {
            assert!(is_temporal(&json!(text)), "expected date: {text}");
        }
    }

    #[test]
    fn test_is_temporal_rejects_non_dates() {
        assert!(!is_temporal(&json!("Checking")));
        assert!(!is_temporal(&json!("2024")));
        assert!(!is_temporal(&json!("")));
        assert!(!is_temporal(&json!(1_709_287_200)));
        assert!(!is_temporal(&Value::Null));
    }
}
