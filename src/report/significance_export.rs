//! Significance report export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Serialize, Serializer};

use crate::pipeline::{Continuity, FeatureSignificanceReport};

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub churnsig_version: String,
    pub input_file: String,
    pub outcome_column: String,
    pub alpha: f64,
    pub continuity: String,
    pub rows: usize,
}

/// Counts across all features
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub features_tested: usize,
    pub significant: usize,
    pub not_significant: usize,
    pub not_testable: usize,
    pub significant_features: Vec<String>,
}

/// Key fields of a tested feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub significant: bool,
}

/// Complete report export with metadata
#[derive(Debug, Serialize)]
pub struct SignificanceExport<'a> {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    /// Feature name to result; `null` for features that could not be tested
    pub results: ResultMap,
    /// Full per-feature detail in test order
    pub features: &'a FeatureSignificanceReport,
}

/// Parameters recorded in the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub outcome_column: &'a str,
    pub alpha: f64,
    pub continuity: Continuity,
    pub rows: usize,
}

/// Feature name to result, in test order.
///
/// Serializes as a JSON object whose keys follow the report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap {
    entries: Vec<(String, Option<ResultSummary>)>,
}

impl ResultMap {
    pub fn get(&self, feature: &str) -> Option<&Option<ResultSummary>> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, summary)| summary)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, summary)| (name, summary)))
    }
}

/// Key→result view of a report
pub fn result_map(report: &FeatureSignificanceReport) -> ResultMap {
    let entries = report
        .iter()
        .map(|entry| {
            let summary = entry.result().map(|r| ResultSummary {
                statistic: r.statistic(),
                p_value: r.p_value(),
                degrees_of_freedom: r.degrees_of_freedom(),
                significant: r.significant(),
            });
            (entry.feature.clone(), summary)
        })
        .collect();
    ResultMap { entries }
}

pub fn build_export<'a>(
    report: &'a FeatureSignificanceReport,
    params: &ExportParams,
) -> SignificanceExport<'a> {
    let significant_features: Vec<String> = report
        .significant_features()
        .into_iter()
        .map(String::from)
        .collect();
    let tested = report.tested_count();

    SignificanceExport {
        metadata: ReportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            churnsig_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            outcome_column: params.outcome_column.to_string(),
            alpha: params.alpha,
            continuity: params.continuity.to_string(),
            rows: params.rows,
        },
        summary: ReportSummary {
            features_tested: tested,
            significant: significant_features.len(),
            not_significant: tested - significant_features.len(),
            not_testable: report.len() - tested,
            significant_features,
        },
        results: result_map(report),
        features: report,
    }
}

/// Export the significance report to a JSON file
pub fn export_significance_report(
    report: &FeatureSignificanceReport,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = build_export(report, params);

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize significance report to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write significance report to {}",
            output_path.display()
        )
    })?;

    Ok(())
}
