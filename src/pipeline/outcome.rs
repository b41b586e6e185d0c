//! Outcome column extraction and label conversion
//!
//! Turns the binary outcome column into per-row `Outcome` values and renders
//! arbitrary columns as string labels for categorical counting and encoding.

use polars::prelude::*;

use super::error::PipelineError;
use super::record::Outcome;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Read the outcome column as one `Outcome` per row.
///
/// The column must be non-empty, not entirely null, and hold only 0/1
/// values (integers, floats within tolerance, or booleans). Null rows map
/// to `None`.
pub fn outcome_mask(df: &DataFrame, column: &str) -> Result<Vec<Option<Outcome>>, PipelineError> {
    let invalid = |detail: String| PipelineError::InvalidOutcome {
        column: column.to_string(),
        detail,
    };

    let col = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?;

    if col.len() == 0 {
        return Err(invalid("column is empty".to_string()));
    }
    if col.null_count() == col.len() {
        return Err(invalid("column contains only null values".to_string()));
    }
    if !col.dtype().is_primitive_numeric() && !matches!(col.dtype(), DataType::Boolean) {
        return Err(invalid(format!("unsupported dtype {}", col.dtype())));
    }

    let float_col = col.cast(&DataType::Float64)?;
    let mut mask = Vec::with_capacity(col.len());

    for value in float_col.f64()?.into_iter() {
        let Some(v) = value else {
            mask.push(None);
            continue;
        };
        let rounded = v.round();
        let outcome = if (v - rounded).abs() < TOLERANCE {
            Outcome::from_flag(rounded as i64)
        } else {
            None
        };
        match outcome {
            Some(outcome) => mask.push(Some(outcome)),
            None => return Err(invalid(format!("found value {}", v))),
        }
    }

    Ok(mask)
}

/// Count positive and negative outcomes
pub fn count_outcomes_total(mask: &[Option<Outcome>]) -> (usize, usize) {
    let exited = mask.iter().filter(|o| **o == Some(Outcome::Exited)).count();
    let retained = mask.iter().filter(|o| **o == Some(Outcome::Retained)).count();
    (exited, retained)
}

/// Render a column as string labels, one per row
pub fn column_labels(col: &Column) -> PolarsResult<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Read a numeric column as `f64` values
pub fn column_values_f64(col: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}
