//! Per-feature significance verdicts and the ordered report that collects them

use serde::Serialize;

use super::chi_square::SignificanceResult;
use super::contingency::ContingencyTable;
use super::error::DegenerateReason;

/// How a feature was turned into categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Categorical,
    Continuous,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Categorical => write!(f, "categorical"),
            FeatureKind::Continuous => write!(f, "continuous"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Tested(SignificanceResult),
    NotTestable { reason: DegenerateReason },
}

/// Report entry for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSignificance {
    pub feature: String,
    pub kind: FeatureKind,
    pub verdict: Verdict,
    /// Observed counts that went into the test
    pub table: ContingencyTable,
    /// Non-null values outside the bin edges (continuous features only)
    pub out_of_range: usize,
    /// Bins removed from the table by configuration
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_bins: Vec<String>,
}

impl FeatureSignificance {
    pub fn result(&self) -> Option<&SignificanceResult> {
        match &self.verdict {
            Verdict::Tested(result) => Some(result),
            Verdict::NotTestable { .. } => None,
        }
    }

    pub fn is_significant(&self) -> bool {
        self.result().is_some_and(|r| r.significant())
    }

    pub fn is_testable(&self) -> bool {
        self.result().is_some()
    }
}

/// Verdicts in test order (the configured feature order)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureSignificanceReport {
    entries: Vec<FeatureSignificance>,
}

impl FeatureSignificanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FeatureSignificance) {
        self.entries.push(entry);
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureSignificance> {
        self.entries.iter().find(|e| e.feature == feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSignificance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.feature.as_str()).collect()
    }

    pub fn significant_features(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_significant())
            .map(|e| e.feature.as_str())
            .collect()
    }

    pub fn not_testable_features(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_testable())
            .map(|e| e.feature.as_str())
            .collect()
    }

    pub fn tested_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_testable()).count()
    }
}

impl<'a> IntoIterator for &'a FeatureSignificanceReport {
    type Item = &'a FeatureSignificance;
    type IntoIter = std::slice::Iter<'a, FeatureSignificance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
