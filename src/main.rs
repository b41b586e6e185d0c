//! Churnsig: Feature Significance CLI Tool
//!
//! Tests churn-dataset features for association with the outcome and writes
//! a one-hot encoded copy of the dataset plus a JSON significance report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::{style, Term};
use tracing_subscriber::EnvFilter;

use churnsig::cli::{Cli, Commands};
use churnsig::pipeline::{load_dataset, qualify_features, DatasetStats, PipelineConfig};
use churnsig::report::{
    display_significance, export_significance_report, write_encoded_dataset, ExportParams,
    QualificationSummary,
};
use churnsig::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success, print_warning,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        return match command {
            Commands::InitConfig { path } => {
                PipelineConfig::default().write_json_file(path)?;
                println!("Wrote default configuration to {}", path.display());
                Ok(())
            }
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let output_path = cli
        .output_path()
        .ok_or_else(|| anyhow::anyhow!("Could not derive an output path from the input"))?;
    let report_path = cli
        .report_path()
        .ok_or_else(|| anyhow::anyhow!("Could not derive a report path from the input"))?;

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.show_progress = Term::stdout().is_term();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        &config.outcome_column,
        &output_path,
        &report_path,
        config.alpha,
        config.feature_names().len(),
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = load_dataset(input, cli.infer_schema_length)?;
    let stats = DatasetStats::of(&df);
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", stats.rows);
    println!("      Columns: {}", stats.columns);
    println!("      Estimated memory: {:.2} MB", stats.memory_mb);
    print_step_time(step_start.elapsed());

    let mut summary = QualificationSummary::new(stats.rows, stats.columns);

    // Step 2: Validate, test and encode
    print_step_header(2, "Significance Testing & Encoding");
    let step_start = Instant::now();
    let qualified = qualify_features(&df, &config)?;
    print_success("Schema validated");
    print_count(
        "significant feature(s)",
        qualified.report.significant_features().len(),
        Some(&format!(
            "of {} tested (α = {})",
            qualified.report.tested_count(),
            config.alpha
        )),
    );
    let not_testable = qualified.report.not_testable_features();
    if not_testable.is_empty() {
        print_info("Every configured feature was testable");
    } else {
        print_warning(&format!("Not testable: {}", not_testable.join(", ")));
    }
    print_success("Encoding verified against source counts");
    summary.record_report(&qualified.report);
    summary.set_encoded_columns(qualified.encoded.width());
    print_step_time(step_start.elapsed());

    // Step 3: Save outputs
    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing encoded dataset...");
    write_encoded_dataset(&qualified.encoded, &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    let input_file = input.display().to_string();
    export_significance_report(
        &qualified.report,
        &report_path,
        &ExportParams {
            input_file: &input_file,
            outcome_column: &config.outcome_column,
            alpha: config.alpha,
            continuity: config.continuity,
            rows: stats.rows,
        },
    )?;
    print_success(&format!("Report saved to {}", report_path.display()));
    print_step_time(step_start.elapsed());

    display_significance(&qualified.report);
    summary.display();
    print_completion();

    Ok(())
}
