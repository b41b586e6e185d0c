//! Error types for the qualification pipeline.
//!
//! Every stage returns `PipelineError`. Only `DegenerateTable` is recovered
//! by the orchestrator; all other variants abort the run unchanged.

use std::fmt;

use polars::prelude::PolarsError;
use serde::Serialize;
use thiserror::Error;

/// Number of null violations rendered in an error message before truncating.
const MAX_DISPLAYED_VIOLATIONS: usize = 10;

/// A single null or sentinel value found during schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullViolation {
    pub field: String,
    pub row: usize,
}

/// Why a contingency table cannot be tested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegenerateReason {
    /// One outcome group has no observations at all.
    ZeroRowTotal { row: usize },
    /// A category has no observations in either outcome group.
    ZeroColumnTotal { label: String },
    /// A category was only observed in one outcome group.
    OneSidedCategory { label: String },
    /// Fewer than two categories remain, so there are no degrees of freedom.
    SingleCategory,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::ZeroRowTotal { row } => {
                let group = if *row == 0 { "positive" } else { "negative" };
                write!(f, "the {} outcome group has no observations", group)
            }
            DegenerateReason::ZeroColumnTotal { label } => {
                write!(f, "category '{}' has no observations", label)
            }
            DegenerateReason::OneSidedCategory { label } => {
                write!(f, "category '{}' is observed in only one outcome group", label)
            }
            DegenerateReason::SingleCategory => {
                write!(f, "fewer than two categories to compare")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema mismatch: missing fields {missing:?}, mismatched fields {mismatched:?}")]
    Schema {
        missing: Vec<String>,
        mismatched: Vec<String>,
    },

    #[error("Found {} null or sentinel value(s): {}", .violations.len(), format_violations(.violations))]
    NullValue { violations: Vec<NullViolation> },

    #[error("Invalid bin range for '{feature}': lower={lower}, upper={upper}, step={step}")]
    InvalidRange {
        feature: String,
        lower: f64,
        upper: f64,
        step: f64,
    },

    #[error("Feature '{feature}' is not testable: {reason}")]
    DegenerateTable {
        feature: String,
        reason: DegenerateReason,
    },

    #[error(
        "Encoding mismatch in '{column}' for label '{label}': expected {expected}, found {actual} (delta {})",
        count_delta(.expected, .actual)
    )]
    EncodingMismatch {
        column: String,
        label: String,
        expected: u64,
        actual: u64,
    },

    #[error("Row count changed during {stage}: expected {expected}, found {actual}")]
    RowCountChanged {
        stage: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Column '{0}' already exists in dataset")]
    ColumnCollision(String),

    #[error("Outcome column '{column}' must be binary (0/1): {detail}")]
    InvalidOutcome { column: String, detail: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    /// True for errors the orchestrator handles locally without aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::DegenerateTable { .. })
    }
}

fn count_delta(expected: &u64, actual: &u64) -> i64 {
    *actual as i64 - *expected as i64
}

fn format_violations(violations: &[NullViolation]) -> String {
    let mut parts: Vec<String> = violations
        .iter()
        .take(MAX_DISPLAYED_VIOLATIONS)
        .map(|v| format!("{}@row {}", v.field, v.row))
        .collect();
    if violations.len() > MAX_DISPLAYED_VIOLATIONS {
        parts.push(format!(
            "... and {} more",
            violations.len() - MAX_DISPLAYED_VIOLATIONS
        ));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_degenerate_table_is_recoverable() {
        let degenerate = PipelineError::DegenerateTable {
            feature: "NumOfProducts".to_string(),
            reason: DegenerateReason::SingleCategory,
        };
        assert!(degenerate.is_recoverable());

        let schema = PipelineError::Schema {
            missing: vec!["Age".to_string()],
            mismatched: Vec::new(),
        };
        assert!(!schema.is_recoverable());
        assert!(!PipelineError::MissingColumn("Age".to_string()).is_recoverable());
    }

    #[test]
    fn test_encoding_mismatch_message_shows_delta() {
        let err = PipelineError::EncodingMismatch {
            column: "Geography".to_string(),
            label: "France".to_string(),
            expected: 5014,
            actual: 5013,
        };
        let msg = err.to_string();
        assert!(msg.contains("France"));
        assert!(msg.contains("delta -1"));
    }

    #[test]
    fn test_null_value_message_truncates() {
        let violations: Vec<NullViolation> = (0..25)
            .map(|row| NullViolation {
                field: "Surname".to_string(),
                row,
            })
            .collect();
        let msg = PipelineError::NullValue { violations }.to_string();
        assert!(msg.starts_with("Found 25 null"));
        assert!(msg.contains("and 15 more"));
    }
}
