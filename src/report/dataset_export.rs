//! Encoded dataset output

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Name of the leading row index column in written datasets
pub const INDEX_COLUMN: &str = "index";

/// Save a dataset with a leading 0-based row index (CSV or Parquet by extension)
pub fn write_encoded_dataset(df: &DataFrame, path: &Path) -> Result<()> {
    let mut indexed = df
        .with_row_index(INDEX_COLUMN.into(), None)
        .context("Failed to add row index column")?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut indexed)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut indexed)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}
