//! Schema validation for incoming datasets

use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{NullViolation, PipelineError};
use super::record::*;

/// Semantic type of an expected field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Real,
    String,
    BinaryFlag,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Real => write!(f, "real"),
            SemanticType::String => write!(f, "string"),
            SemanticType::BinaryFlag => write!(f, "binary-flag"),
        }
    }
}

impl SemanticType {
    fn accepts(self, dtype: &DataType) -> bool {
        match self {
            SemanticType::Integer => dtype.is_integer(),
            SemanticType::Real => dtype.is_primitive_numeric(),
            SemanticType::String => matches!(dtype, DataType::String),
            SemanticType::BinaryFlag => dtype.is_integer() || matches!(dtype, DataType::Boolean),
        }
    }
}

/// A named field and the semantic type it must carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl FieldSpec {
    pub fn new(name: &str, semantic_type: SemanticType) -> Self {
        Self {
            name: name.to_string(),
            semantic_type,
        }
    }
}

/// Expected set of fields plus string values that count as null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    pub fields: Vec<FieldSpec>,
    /// Compared case-insensitively after trimming. Blank strings are always null.
    #[serde(default = "default_sentinels")]
    pub null_sentinels: Vec<String>,
}

fn default_sentinels() -> Vec<String> {
    vec!["missing".to_string()]
}

impl Default for ExpectedSchema {
    fn default() -> Self {
        Self::churn()
    }
}

impl ExpectedSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            null_sentinels: default_sentinels(),
        }
    }

    /// The 14-field churn dataset schema
    pub fn churn() -> Self {
        use SemanticType::*;
        Self::new(vec![
            FieldSpec::new(ROW_NUMBER, Integer),
            FieldSpec::new(CUSTOMER_ID, Integer),
            FieldSpec::new(SURNAME, String),
            FieldSpec::new(CREDIT_SCORE, Integer),
            FieldSpec::new(GEOGRAPHY, String),
            FieldSpec::new(GENDER, String),
            FieldSpec::new(AGE, Integer),
            FieldSpec::new(TENURE, Integer),
            FieldSpec::new(BALANCE, Real),
            FieldSpec::new(NUM_OF_PRODUCTS, Integer),
            FieldSpec::new(HAS_CR_CARD, BinaryFlag),
            FieldSpec::new(IS_ACTIVE_MEMBER, BinaryFlag),
            FieldSpec::new(ESTIMATED_SALARY, Real),
            FieldSpec::new(EXITED, BinaryFlag),
        ])
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn is_sentinel(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || self
                .null_sentinels
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(trimmed))
    }
}

/// Validate a dataset against the expected schema.
///
/// Presence and types are checked first, then nulls (native and sentinel),
/// then the 0/1 domain of binary flags. Returns the same frame on success.
pub fn validate_schema<'a>(
    df: &'a DataFrame,
    schema: &ExpectedSchema,
) -> Result<&'a DataFrame, PipelineError> {
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in &schema.fields {
        match df.column(&spec.name) {
            Ok(col) => {
                if !spec.semantic_type.accepts(col.dtype()) {
                    mismatched.push(format!(
                        "{} (expected {}, found {})",
                        spec.name,
                        spec.semantic_type,
                        col.dtype()
                    ));
                }
            }
            Err(_) => missing.push(spec.name.clone()),
        }
    }

    if !missing.is_empty() || !mismatched.is_empty() {
        return Err(PipelineError::Schema {
            missing,
            mismatched,
        });
    }

    let extra: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| schema.field(name.as_str()).is_none())
        .map(|name| name.to_string())
        .collect();
    if !extra.is_empty() {
        debug!(columns = ?extra, "dataset carries columns outside the expected schema");
    }

    let violations = find_null_violations(df, schema)?;
    if !violations.is_empty() {
        return Err(PipelineError::NullValue { violations });
    }

    let flag_errors = check_binary_flags(df, schema)?;
    if !flag_errors.is_empty() {
        return Err(PipelineError::Schema {
            missing: Vec::new(),
            mismatched: flag_errors,
        });
    }

    debug!(rows = df.height(), fields = schema.fields.len(), "schema validated");
    Ok(df)
}

/// Collect every null or sentinel cell, ordered by row
fn find_null_violations(
    df: &DataFrame,
    schema: &ExpectedSchema,
) -> PolarsResult<Vec<NullViolation>> {
    let mut violations = Vec::new();

    for spec in &schema.fields {
        let col = df.column(&spec.name)?;

        if col.null_count() > 0 {
            for (row, is_null) in col.as_materialized_series().is_null().into_iter().enumerate() {
                if is_null.unwrap_or(false) {
                    violations.push(NullViolation {
                        field: spec.name.clone(),
                        row,
                    });
                }
            }
        }

        if matches!(col.dtype(), DataType::String) {
            for (row, value) in col.str()?.into_iter().enumerate() {
                if let Some(s) = value {
                    if schema.is_sentinel(s) {
                        violations.push(NullViolation {
                            field: spec.name.clone(),
                            row,
                        });
                    }
                }
            }
        }
    }

    violations.sort_by(|a, b| a.row.cmp(&b.row));
    Ok(violations)
}

fn check_binary_flags(df: &DataFrame, schema: &ExpectedSchema) -> PolarsResult<Vec<String>> {
    let mut errors = Vec::new();

    for spec in schema
        .fields
        .iter()
        .filter(|f| f.semantic_type == SemanticType::BinaryFlag)
    {
        let col = df.column(&spec.name)?.cast(&DataType::Int64)?;
        let bad = col
            .i64()?
            .into_iter()
            .flatten()
            .find(|v| *v != 0 && *v != 1);
        if let Some(value) = bad {
            errors.push(format!("{} (expected 0/1, found {})", spec.name, value));
        }
    }

    Ok(errors)
}
