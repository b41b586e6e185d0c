//! Qualification summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{FeatureSignificanceReport, Verdict};

/// Shape and outcome counts of a qualification run
#[derive(Debug, Default)]
pub struct QualificationSummary {
    pub rows: usize,
    pub initial_columns: usize,
    pub encoded_columns: usize,
    pub features_tested: usize,
    pub significant: Vec<String>,
    pub not_testable: Vec<String>,
}

impl QualificationSummary {
    pub fn new(rows: usize, initial_columns: usize) -> Self {
        Self {
            rows,
            initial_columns,
            encoded_columns: initial_columns,
            ..Default::default()
        }
    }

    pub fn record_report(&mut self, report: &FeatureSignificanceReport) {
        self.features_tested = report.tested_count();
        self.significant = report
            .significant_features()
            .into_iter()
            .map(String::from)
            .collect();
        self.not_testable = report
            .not_testable_features()
            .into_iter()
            .map(String::from)
            .collect();
    }

    pub fn set_encoded_columns(&mut self, columns: usize) {
        self.encoded_columns = columns;
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("QUALIFICATION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows)]);
        table.add_row(vec![
            Cell::new("🧮 Columns (in → out)"),
            Cell::new(format!("{} → {}", self.initial_columns, self.encoded_columns)),
        ]);
        table.add_row(vec![
            Cell::new("🧪 Features Tested"),
            Cell::new(self.features_tested),
        ]);
        table.add_row(vec![
            Cell::new("✅ Significant"),
            Cell::new(self.significant.len())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  Not Testable"),
            Cell::new(self.not_testable.len()).fg(if self.not_testable.is_empty() {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.not_testable.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Not testable").yellow(),
                style(format!("({})", self.not_testable.len())).dim()
            );
            for feature in &self.not_testable {
                println!("        {} {}", style("•").dim(), feature);
            }
        }
    }
}

/// Build the per-feature results table (one row per feature, in test order)
pub fn significance_table(report: &FeatureSignificanceReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Categories").add_attribute(Attribute::Bold),
        Cell::new("χ²").add_attribute(Attribute::Bold),
        Cell::new("dof").add_attribute(Attribute::Bold),
        Cell::new("p-value").add_attribute(Attribute::Bold),
        Cell::new("Verdict").add_attribute(Attribute::Bold),
    ]);

    for entry in report {
        let categories = Cell::new(entry.table.num_columns()).set_alignment(CellAlignment::Right);
        match &entry.verdict {
            Verdict::Tested(result) => {
                let verdict = if result.significant() {
                    Cell::new("significant")
                        .fg(Color::Green)
                        .add_attribute(Attribute::Bold)
                } else {
                    Cell::new("not significant").fg(Color::White)
                };
                table.add_row(vec![
                    Cell::new(&entry.feature),
                    Cell::new(entry.kind),
                    categories,
                    Cell::new(format!("{:.4}", result.statistic()))
                        .set_alignment(CellAlignment::Right),
                    Cell::new(result.degrees_of_freedom()).set_alignment(CellAlignment::Right),
                    Cell::new(format_p_value(result.p_value()))
                        .set_alignment(CellAlignment::Right),
                    verdict,
                ]);
            }
            Verdict::NotTestable { reason } => {
                table.add_row(vec![
                    Cell::new(&entry.feature),
                    Cell::new(entry.kind),
                    categories,
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("not testable: {}", reason)).fg(Color::Yellow),
                ]);
            }
        }
    }

    table
}

/// Print the per-feature results table
pub fn display_significance(report: &FeatureSignificanceReport) {
    println!();
    println!(
        "    {} {}",
        style("📊").cyan(),
        style("FEATURE SIGNIFICANCE").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in significance_table(report).to_string().lines() {
        println!("    {}", line);
    }
}

/// Fixed notation down to 1e-4, scientific below
pub fn format_p_value(p: f64) -> String {
    if p == 0.0 {
        "0".to_string()
    } else if p < 1e-4 {
        format!("{:.3e}", p)
    } else {
        format!("{:.4}", p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.49237), "0.4924");
        assert_eq!(format_p_value(0.0), "0");
        assert!(format_p_value(3.8e-66).contains('e'));
    }

    #[test]
    fn test_empty_report_table_has_only_header() {
        let table = significance_table(&FeatureSignificanceReport::new());
        assert_eq!(table.row_iter().count(), 0);
    }
}
