//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineConfig;

/// Churnsig - Test churn features for significance and one-hot encode the dataset
#[derive(Parser, Debug)]
#[command(name = "churnsig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Encoded dataset output path (CSV or Parquet, determined by extension).
    /// Defaults to input directory with '_encoded' suffix (e.g., churn.csv → churn_encoded.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Significance report path (JSON).
    /// Defaults to input directory with '_significance.json' suffix.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Pipeline configuration file (JSON). See `churnsig init-config`.
    /// Without it the built-in churn configuration is used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Significance level; overrides the configured alpha.
    /// A feature is significant when its p-value is below this value.
    #[arg(long, value_parser = validate_alpha_arg)]
    pub alpha: Option<f64>,

    /// Test features one at a time instead of on the thread pool
    #[arg(long, default_value = "false")]
    pub sequential: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default pipeline configuration as JSON
    InitConfig {
        /// Destination of the configuration file
        path: PathBuf,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        let input = self.input.as_ref()?;
        Some(sibling_path(input, "_encoded.csv"))
    }

    /// Get the report path, deriving from input if not explicitly provided.
    pub fn report_path(&self) -> Option<PathBuf> {
        if let Some(report) = &self.report {
            return Some(report.clone());
        }
        let input = self.input.as_ref()?;
        Some(sibling_path(input, "_significance.json"))
    }

    /// Apply flag overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if self.sequential {
            config.parallel = false;
        }
    }
}

fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}", stem, suffix))
}

/// Validator for the alpha parameter
fn validate_alpha_arg(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("alpha must be between 0.0 and 1.0 (exclusive), got {}", value))
    }
}
