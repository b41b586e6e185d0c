//! One-hot encoding of categorical columns and round-trip count checks

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use tracing::debug;

use super::error::PipelineError;
use super::outcome::column_labels;

/// Name of the indicator column for `label` of `column`
pub fn indicator_name(column: &str, label: &str) -> String {
    format!("{}_{}", column, label)
}

/// Distinct non-null labels of a column, sorted
pub fn discover_labels(df: &DataFrame, column: &str) -> Result<Vec<String>, PipelineError> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?;
    let labels: BTreeSet<String> = column_labels(col)?.into_iter().flatten().collect();
    Ok(labels.into_iter().collect())
}

/// Count occurrences of each non-null label of a column
pub fn label_counts(df: &DataFrame, column: &str) -> Result<BTreeMap<String, u64>, PipelineError> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?;
    let mut counts = BTreeMap::new();
    for label in column_labels(col)?.into_iter().flatten() {
        *counts.entry(label).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Replace `column` with one Int32 indicator per label found in the data.
///
/// Indicators take the original column's position, in sorted label order.
/// Null values produce an all-zero row. The input frame is left untouched.
pub fn one_hot_encode(df: &DataFrame, column: &str) -> Result<DataFrame, PipelineError> {
    let position = df
        .get_column_index(column)
        .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))?;
    let labels = column_labels(df.column(column)?)?;
    let categories: BTreeSet<&str> = labels.iter().flatten().map(String::as_str).collect();

    let mut encoded = df.drop(column)?;

    for (offset, category) in categories.iter().enumerate() {
        let name = indicator_name(column, category);
        if encoded.get_column_index(&name).is_some() {
            return Err(PipelineError::ColumnCollision(name));
        }

        let indicator: Vec<i32> = labels
            .iter()
            .map(|label| (label.as_deref() == Some(*category)) as i32)
            .collect();
        encoded.insert_column(position + offset, Column::new(name.into(), indicator))?;
    }

    if encoded.height() != df.height() {
        return Err(PipelineError::RowCountChanged {
            stage: format!("encoding of '{}'", column),
            expected: df.height(),
            actual: encoded.height(),
        });
    }

    debug!(column, categories = categories.len(), "one-hot encoded column");
    Ok(encoded)
}

/// Encode several columns in order
pub fn one_hot_encode_all(df: &DataFrame, columns: &[String]) -> Result<DataFrame, PipelineError> {
    let mut encoded = df.clone();
    for column in columns {
        encoded = one_hot_encode(&encoded, column)?;
    }
    Ok(encoded)
}

/// Check that the encoding of `column` preserved every label count.
///
/// For each label L of the original column, the indicator `column_L` must
/// sum to the number of rows equal to L. A missing indicator sums to zero.
pub fn validate_encoding(
    original: &DataFrame,
    encoded: &DataFrame,
    column: &str,
) -> Result<(), PipelineError> {
    if original.height() != encoded.height() {
        return Err(PipelineError::RowCountChanged {
            stage: format!("encoding of '{}'", column),
            expected: original.height(),
            actual: encoded.height(),
        });
    }
    if encoded.get_column_index(column).is_some() {
        return Err(PipelineError::ColumnCollision(column.to_string()));
    }

    for (label, expected) in label_counts(original, column)? {
        let name = indicator_name(column, &label);
        let actual = match encoded.column(&name) {
            Ok(indicator) => indicator_sum(indicator)?,
            Err(_) => 0,
        };

        if actual != expected {
            return Err(PipelineError::EncodingMismatch {
                column: column.to_string(),
                label,
                expected,
                actual,
            });
        }
    }

    Ok(())
}

fn indicator_sum(indicator: &Column) -> PolarsResult<u64> {
    let cast = indicator.cast(&DataType::Int64)?;
    let sum: i64 = cast.i64()?.into_iter().flatten().sum();
    Ok(sum.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "id" => [1i64, 2, 3, 4],
            "Geography" => ["France", "Spain", "France", "Germany"],
            "Exited" => [1i32, 0, 0, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_indicators_replace_column_in_place() {
        let df = sample();
        let encoded = one_hot_encode(&df, "Geography").unwrap();

        let names: Vec<String> = encoded
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "id",
                "Geography_France",
                "Geography_Germany",
                "Geography_Spain",
                "Exited"
            ]
        );

        let france: Vec<i32> = encoded
            .column("Geography_France")
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(france, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_source_frame_not_mutated() {
        let df = sample();
        let before = df.clone();
        let _ = one_hot_encode(&df, "Geography").unwrap();
        assert!(df.equals(&before));
    }

    #[test]
    fn test_nulls_give_all_zero_rows() {
        let df = df! {
            "g" => [Some("a"), None, Some("b")],
        }
        .unwrap();
        let encoded = one_hot_encode(&df, "g").unwrap();
        assert_eq!(encoded.width(), 2);
        let a: Vec<i32> = encoded.column("g_a").unwrap().i32().unwrap().into_no_null_iter().collect();
        let b: Vec<i32> = encoded.column("g_b").unwrap().i32().unwrap().into_no_null_iter().collect();
        assert_eq!(a, vec![1, 0, 0]);
        assert_eq!(b, vec![0, 0, 1]);
    }

    #[test]
    fn test_collision_is_rejected() {
        let df = df! {
            "g" => ["a", "b"],
            "g_a" => [0i32, 0],
        }
        .unwrap();
        assert!(matches!(
            one_hot_encode(&df, "g"),
            Err(PipelineError::ColumnCollision(name)) if name == "g_a"
        ));
    }

    #[test]
    fn test_missing_column() {
        assert!(matches!(
            one_hot_encode(&sample(), "Gender"),
            Err(PipelineError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_validate_encoding_accepts_clean_encoding() {
        let df = sample();
        let encoded = one_hot_encode(&df, "Geography").unwrap();
        assert!(validate_encoding(&df, &encoded, "Geography").is_ok());
    }

    #[test]
    fn test_validate_encoding_flags_missing_indicator() {
        let df = sample();
        let encoded = one_hot_encode(&df, "Geography")
            .unwrap()
            .drop("Geography_Spain")
            .unwrap();
        let err = validate_encoding(&df, &encoded, "Geography").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::EncodingMismatch { ref label, expected: 1, actual: 0, .. } if label == "Spain"
        ));
    }

    #[test]
    fn test_label_counts_and_discovery() {
        let df = sample();
        let counts = label_counts(&df, "Geography").unwrap();
        assert_eq!(counts.get("France"), Some(&2));
        assert_eq!(
            discover_labels(&df, "Geography").unwrap(),
            vec!["France", "Germany", "Spain"]
        );
    }
}
