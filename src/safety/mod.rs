//! Query safety gate for LLM-authored SQL.
//!
//! Decides from the literal SQL text alone whether a query may be executed.
//! There is no parser here: the check is a conservative allow-list of
//! statement prefixes plus a substring deny-list, biased toward rejecting
//! harmless text over accepting harmful text.
//!
//! Passing validation is necessary but not sufficient. Queries should still
//! run under a read-only, least-privileged database role.

mod validator;

pub use validator::{find_forbidden_keyword, validate_query, FORBIDDEN_KEYWORDS};

use crate::error::AnalystError;

/// Outcome of validating a SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the query may be executed.
    pub is_valid: bool,
    /// Reason for rejection, set only when `is_valid` is false.
    pub error: Option<String>,
}

impl ValidationResult {
    /// Creates an accepting result.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// Creates a rejecting result with the given reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(reason.into()),
        }
    }

    /// Converts the result into a `Result`, mapping rejection to a validation error.
    pub fn into_result(self) -> crate::error::Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(AnalystError::validation(
                self.error
                    .unwrap_or_else(|| "Query rejected".to_string()),
            ))
        }
    }
}
