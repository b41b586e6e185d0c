//! Pipeline configuration
//!
//! Everything the orchestrator needs is carried by `PipelineConfig` and passed
//! into each call. Defaults describe the churn dataset.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::binning::BinSpec;
use super::chi_square::{validate_alpha, Continuity, DEFAULT_ALPHA};
use super::error::PipelineError;
use super::record::*;
use super::schema::ExpectedSchema;

/// Bin parameters for one continuous feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousFeature {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub step: f64,
    /// Bin indices left out of the chi-squared input
    #[serde(default)]
    pub excluded_bins: Vec<usize>,
}

impl ContinuousFeature {
    pub fn new(name: &str, lower: f64, upper: f64, step: f64) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
            step,
            excluded_bins: Vec::new(),
        }
    }

    pub fn excluding(mut self, bins: &[usize]) -> Self {
        self.excluded_bins = bins.to_vec();
        self
    }

    pub fn bin_spec(&self) -> Result<BinSpec, PipelineError> {
        BinSpec::fixed_width(&self.name, self.lower, self.upper, self.step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Significance threshold; a feature is significant when p < alpha
    pub alpha: f64,
    pub outcome_column: String,
    pub schema: ExpectedSchema,
    /// Tested directly on their labels, in this order
    pub categorical_features: Vec<String>,
    /// Binned then tested, after the categorical features
    pub continuous_features: Vec<ContinuousFeature>,
    /// Columns replaced by indicator columns in the encoded dataset
    pub encode_columns: Vec<String>,
    pub continuity: Continuity,
    /// Test features on the rayon pool
    pub parallel: bool,
    #[serde(skip)]
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            outcome_column: EXITED.to_string(),
            schema: ExpectedSchema::churn(),
            categorical_features: [GEOGRAPHY, GENDER, HAS_CR_CARD, IS_ACTIVE_MEMBER, NUM_OF_PRODUCTS]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            continuous_features: vec![
                ContinuousFeature::new(CREDIT_SCORE, 350.0, 850.0, 100.0),
                ContinuousFeature::new(AGE, 10.0, 100.0, 10.0).excluding(&[0]),
                ContinuousFeature::new(TENURE, 0.0, 11.0, 1.0).excluding(&[0]),
                ContinuousFeature::new(BALANCE, 0.0, 300_000.0, 50_000.0),
                ContinuousFeature::new(ESTIMATED_SALARY, 0.0, 200_000.0, 20_000.0),
            ],
            encode_columns: vec![GEOGRAPHY.to_string(), GENDER.to_string()],
            continuity: Continuity::default(),
            parallel: true,
            show_progress: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Names of every tested feature in report order
    pub fn feature_names(&self) -> Vec<&str> {
        self.categorical_features
            .iter()
            .map(String::as_str)
            .chain(self.continuous_features.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_alpha(self.alpha)?;

        let mut seen = HashSet::new();
        for name in self.feature_names() {
            if name == self.outcome_column {
                return Err(PipelineError::InvalidConfig(format!(
                    "outcome column '{}' cannot be tested as a feature",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(PipelineError::InvalidConfig(format!(
                    "feature '{}' is configured more than once",
                    name
                )));
            }
        }

        for feature in &self.continuous_features {
            let spec = feature.bin_spec()?;
            if let Some(bad) = feature
                .excluded_bins
                .iter()
                .find(|b| **b >= spec.num_bins())
            {
                return Err(PipelineError::InvalidConfig(format!(
                    "excluded bin {} is out of range for '{}' ({} bins)",
                    bad,
                    feature.name,
                    spec.num_bins()
                )));
            }
        }

        if self.encode_columns.iter().any(|c| *c == self.outcome_column) {
            return Err(PipelineError::InvalidConfig(format!(
                "outcome column '{}' cannot be one-hot encoded",
                self.outcome_column
            )));
        }

        Ok(())
    }
}
