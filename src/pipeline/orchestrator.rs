//! Orchestrates validation, significance testing, encoding and encoding QA

use indicatif::ProgressBar;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::binning::{bin_column, BinSpec};
use super::chi_square::chi_square_test;
use super::config::{ContinuousFeature, PipelineConfig};
use super::contingency::{build_contingency_table, build_labeled_table, count_outcomes};
use super::encoding::{one_hot_encode_all, validate_encoding};
use super::error::PipelineError;
use super::outcome::{column_labels, column_values_f64, count_outcomes_total, outcome_mask};
use super::record::Outcome;
use super::schema::validate_schema;
use super::significance::{FeatureKind, FeatureSignificance, FeatureSignificanceReport, Verdict};
use crate::utils::create_progress_bar;

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct QualifiedDataset {
    pub report: FeatureSignificanceReport,
    pub encoded: DataFrame,
}

/// One feature scheduled for testing
#[derive(Debug, Clone, Copy)]
enum FeaturePlan<'a> {
    Categorical(&'a str),
    Continuous(&'a ContinuousFeature),
}

impl FeaturePlan<'_> {
    fn name(&self) -> &str {
        match self {
            FeaturePlan::Categorical(name) => name,
            FeaturePlan::Continuous(feature) => &feature.name,
        }
    }
}

/// Run the full pipeline over a dataset.
///
/// Aborts on the first fatal error, returning it unchanged; no partial
/// report is produced. Degenerate tables mark the feature not testable.
pub fn qualify_features(
    df: &DataFrame,
    config: &PipelineConfig,
) -> Result<QualifiedDataset, PipelineError> {
    config.validate()?;
    validate_schema(df, &config.schema)?;

    let outcomes = outcome_mask(df, &config.outcome_column)?;
    let (exited, retained) = count_outcomes_total(&outcomes);
    info!(rows = df.height(), exited, retained, "dataset validated");

    let report = run_significance_tests(df, &outcomes, config)?;
    info!(
        tested = report.tested_count(),
        significant = report.significant_features().len(),
        not_testable = report.not_testable_features().len(),
        "significance tests complete"
    );

    let encoded = encode_and_verify(df, &config.encode_columns)?;
    info!(columns = encoded.width(), "encoding verified");

    Ok(QualifiedDataset { report, encoded })
}

/// Test every configured feature against the outcome.
///
/// Features may run in parallel, but entries are recorded in configured
/// order, and the first fatal error in that order is returned.
pub fn run_significance_tests(
    df: &DataFrame,
    outcomes: &[Option<Outcome>],
    config: &PipelineConfig,
) -> Result<FeatureSignificanceReport, PipelineError> {
    let plans: Vec<FeaturePlan> = config
        .categorical_features
        .iter()
        .map(|name| FeaturePlan::Categorical(name))
        .chain(config.continuous_features.iter().map(FeaturePlan::Continuous))
        .collect();

    let pb = if config.show_progress {
        create_progress_bar(plans.len() as u64, "   Testing features")
    } else {
        ProgressBar::hidden()
    };

    let evaluate = |plan: &FeaturePlan| {
        let result = test_feature(df, outcomes, plan, config);
        pb.inc(1);
        result
    };

    let results: Vec<Result<FeatureSignificance, PipelineError>> = if config.parallel {
        plans.par_iter().map(evaluate).collect()
    } else {
        plans.iter().map(evaluate).collect()
    };
    pb.finish_and_clear();

    let mut report = FeatureSignificanceReport::new();
    for result in results {
        report.push(result?);
    }
    Ok(report)
}

fn test_feature(
    df: &DataFrame,
    outcomes: &[Option<Outcome>],
    plan: &FeaturePlan,
    config: &PipelineConfig,
) -> Result<FeatureSignificance, PipelineError> {
    let name = plan.name();
    let col = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;

    let (kind, table, out_of_range, excluded_bins) = match plan {
        FeaturePlan::Categorical(_) => {
            let counts = count_outcomes(column_labels(col)?, outcomes);
            let table = build_contingency_table(&counts.positive, &counts.negative);
            (FeatureKind::Categorical, table, 0, Vec::new())
        }
        FeaturePlan::Continuous(feature) => {
            let spec = feature.bin_spec()?;
            let binned = bin_column(&column_values_f64(col)?, &spec);
            if binned.out_of_range > 0 {
                warn!(
                    feature = name,
                    count = binned.out_of_range,
                    "values outside bin edges excluded from test"
                );
            }

            let counts = count_outcomes(binned.assignments, outcomes)
                .without(|bin| feature.excluded_bins.contains(bin));
            let table = build_labeled_table(&counts.positive, &counts.negative, |bin| spec.label(*bin));
            let excluded = excluded_labels(&spec, &feature.excluded_bins);
            (FeatureKind::Continuous, table, binned.out_of_range, excluded)
        }
    };

    let verdict = match chi_square_test(name, &table, config.alpha, config.continuity) {
        Ok(result) => {
            debug!(
                feature = name,
                statistic = result.statistic(),
                p_value = result.p_value(),
                dof = result.degrees_of_freedom(),
                "feature tested"
            );
            Verdict::Tested(result)
        }
        Err(PipelineError::DegenerateTable { reason, .. }) => {
            warn!(feature = name, %reason, "feature not testable");
            Verdict::NotTestable { reason }
        }
        Err(e) => return Err(e),
    };

    Ok(FeatureSignificance {
        feature: name.to_string(),
        kind,
        verdict,
        table,
        out_of_range,
        excluded_bins,
    })
}

fn excluded_labels(spec: &BinSpec, excluded: &[usize]) -> Vec<String> {
    let mut bins = excluded.to_vec();
    bins.sort_unstable();
    bins.dedup();
    bins.into_iter().map(|b| spec.label(b)).collect()
}

/// One-hot encode the given columns and check every encoding against the source
pub fn encode_and_verify(df: &DataFrame, columns: &[String]) -> Result<DataFrame, PipelineError> {
    let encoded = one_hot_encode_all(df, columns)?;
    for column in columns {
        validate_encoding(df, &encoded, column)?;
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schema::{ExpectedSchema, FieldSpec, SemanticType};

    fn small_config(parallel: bool) -> PipelineConfig {
        PipelineConfig {
            outcome_column: "y".to_string(),
            schema: ExpectedSchema::new(vec![
                FieldSpec::new("region", SemanticType::String),
                FieldSpec::new("score", SemanticType::Real),
                FieldSpec::new("y", SemanticType::BinaryFlag),
            ]),
            categorical_features: vec!["region".to_string()],
            continuous_features: vec![ContinuousFeature::new("score", 0.0, 10.0, 5.0)],
            encode_columns: vec!["region".to_string()],
            parallel,
            ..Default::default()
        }
    }

    fn small_frame() -> DataFrame {
        df! {
            "region" => ["a", "a", "b", "b", "a", "b", "a", "b"],
            "score" => [1.0f64, 2.0, 6.0, 7.0, 3.0, 8.0, 9.0, 4.0],
            "y" => [1i32, 1, 0, 0, 0, 1, 0, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_report_follows_configured_order() {
        let out = qualify_features(&small_frame(), &small_config(true)).unwrap();
        assert_eq!(out.report.feature_names(), vec!["region", "score"]);
        assert_eq!(out.report.get("score").unwrap().kind, FeatureKind::Continuous);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let parallel = qualify_features(&small_frame(), &small_config(true)).unwrap();
        let sequential = qualify_features(&small_frame(), &small_config(false)).unwrap();
        assert_eq!(parallel.report, sequential.report);
        assert!(parallel.encoded.equals(&sequential.encoded));
    }

    #[test]
    fn test_excluded_bins_are_removed_from_table() {
        let mut config = small_config(false);
        config.continuous_features[0].excluded_bins = vec![0];
        let out = qualify_features(&small_frame(), &config).unwrap();

        let entry = out.report.get("score").unwrap();
        assert_eq!(entry.excluded_bins, vec!["[0, 5)"]);
        assert_eq!(entry.table.labels(), &["[5, 10]"]);
        // One remaining bin cannot be tested
        assert!(!entry.is_testable());
    }

    #[test]
    fn test_encoded_frame_replaces_region() {
        let out = qualify_features(&small_frame(), &small_config(false)).unwrap();
        assert_eq!(out.encoded.height(), 8);
        assert!(out.encoded.column("region").is_err());
        assert!(out.encoded.column("region_a").is_ok());
        assert!(out.encoded.column("region_b").is_ok());
    }
}
