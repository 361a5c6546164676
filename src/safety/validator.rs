//! Allow-list / deny-list validation of SQL text.

use super::ValidationResult;

/// Substrings that reject a query wherever they appear, including inside
/// string literals and identifiers.
///
/// `execute` precedes `exec` so the longer keyword is the one reported.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "drop", "delete", "insert", "update", "alter", "truncate", "create", "grant", "revoke",
    "execute", "exec", "call", "declare", "merge", "replace", "rename", "comment",
];

/// Validates that a SQL string is a read-only SELECT (optionally behind a CTE).
///
/// Rules are checked in order and the first violation is reported:
/// empty text, statement prefix, CTE body, forbidden keywords. Structural
/// rejections also name a forbidden keyword when one is present.
pub fn validate_query(query: &str) -> ValidationResult {
    let lowered = query.trim().to_lowercase();

    if lowered.is_empty() {
        return ValidationResult::invalid("Query is empty");
    }

    let forbidden = find_forbidden_keyword(&lowered);

    let is_select = lowered.starts_with("select");
    let is_cte = lowered.starts_with("with");

    if !is_select && !is_cte {
        return ValidationResult::invalid(with_keyword(
            "Only SELECT queries are allowed",
            forbidden,
        ));
    }

    if is_cte && !lowered["with".len()..].contains("select") {
        return ValidationResult::invalid(with_keyword(
            "CTE queries must contain a SELECT statement",
            forbidden,
        ));
    }

    if let Some(keyword) = forbidden {
        return ValidationResult::invalid(format!(
            "Query contains forbidden keyword '{keyword}'"
        ));
    }

    ValidationResult::valid()
}

/// Returns the first deny-listed keyword contained in the text, if any.
///
/// Matching is case-insensitive and substring-based.
pub fn find_forbidden_keyword(query: &str) -> Option<&'static str> {
    let lowered = query.to_lowercase();
    FORBIDDEN_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}

fn with_keyword(reason: &str, keyword: Option<&str>) -> String {
    match keyword {
        Some(keyword) => format!("{reason} (found forbidden keyword '{keyword}')"),
        None => reason.to_string(),
    }
}
