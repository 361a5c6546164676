//! Carrying chart data through a prose text stream.
//!
//! Charts are appended to narrative output as JSON wrapped in sentinel
//! markers. A stream consumer finds the markers, decodes the JSON and strips
//! the block from the text it renders.

use std::sync::OnceLock;

use regex::Regex;

use super::ChartData;
use crate::error::{AnalystError, Result};

/// Marker opening an embedded chart block.
pub const CHART_START: &str = "<!--CHART_DATA_START-->";

/// Marker closing an embedded chart block.
pub const CHART_END: &str = "<!--CHART_DATA_END-->";

fn chart_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            "(?s){}(.*?){}",
            regex::escape(CHART_START),
            regex::escape(CHART_END)
        ))
        .expect("chart marker pattern is valid")
    })
}

/// Encodes charts as a single marker-delimited block.
///
/// `<` only occurs inside JSON strings, so escaping it keeps marker text in
/// labels from terminating the block early.
pub fn encode_charts(charts: &[ChartData]) -> Result<String> {
    let json = serde_json::to_string(charts)
        .map_err(|e| AnalystError::encoding(format!("Failed to encode charts: {e}")))?
        .replace('<', "\\u003c");
    Ok(format!("{CHART_START}{json}{CHART_END}"))
}

/// Appends a chart block to narrative text. No block is added for an empty list.
pub fn append_charts(narrative: &str, charts: &[ChartData]) -> Result<String> {
    if charts.is_empty() {
        return Ok(narrative.to_string());
    }

    let block = encode_charts(charts)?;
    if narrative.is_empty() {
        Ok(block)
    } else {
        Ok(format!("{narrative}\n\n{block}"))
    }
}

/// Extracts every chart block from text.
///
/// Returns the text with the blocks removed and the charts from all blocks
/// in order of appearance.
pub fn extract_charts_from_text(text: &str) -> Result<(String, Vec<ChartData>)> {
    let pattern = chart_block_pattern();

    let mut charts = Vec::new();
    for captures in pattern.captures_iter(text) {
        let payload = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let block: Vec<ChartData> = serde_json::from_str(payload)
            .map_err(|e| AnalystError::encoding(format!("Malformed chart block: {e}")))?;
        charts.extend(block);
    }

    let stripped = pattern.replace_all(text, "");
    Ok((stripped.trim_end().to_string(), charts))
}
