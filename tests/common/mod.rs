//! Shared test utilities and fixture generators

#![allow(dead_code)]

use churnsig::pipeline::{records_to_frame, CustomerRecord, Outcome};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// Observed geography counts: (label, exited, retained)
pub const REGION_COUNTS: [(&str, usize, usize); 3] = [
    ("France", 810, 4204),
    ("Germany", 814, 1695),
    ("Spain", 413, 2064),
];

/// Observed credit-card counts: (flag, exited, retained)
pub const CARD_COUNTS: [(bool, usize, usize); 2] = [(false, 613, 2332), (true, 1424, 5631)];

fn record(index: usize, geography: &str, has_cr_card: bool, outcome: Outcome) -> CustomerRecord {
    let i = index as i64;
    CustomerRecord {
        row_number: i + 1,
        customer_id: 15_500_000 + i,
        surname: format!("Surname{}", index % 97),
        credit_score: 350 + (i * 37) % 501,
        geography: geography.to_string(),
        gender: if index % 2 == 0 { "Female" } else { "Male" }.to_string(),
        age: 20 + (i * 7) % 60,
        tenure: i % 11,
        balance: ((i * 1237) % 250_000) as f64,
        num_of_products: 1 + i % 4,
        has_cr_card,
        is_active_member: index % 3 != 0,
        estimated_salary: ((i * 977) % 200_000) as f64 + 0.5,
        outcome,
    }
}

/// 10,000 records whose Geography and HasCrCard contingency tables match
/// `REGION_COUNTS` and `CARD_COUNTS` exactly.
pub fn reference_churn_records() -> Vec<CustomerRecord> {
    let mut records = Vec::with_capacity(10_000);

    for outcome in [Outcome::Exited, Outcome::Retained] {
        let pick = |exited: usize, retained: usize| match outcome {
            Outcome::Exited => exited,
            Outcome::Retained => retained,
        };
        let geographies: Vec<&str> = REGION_COUNTS
            .iter()
            .flat_map(|&(label, e, r)| std::iter::repeat(label).take(pick(e, r)))
            .collect();
        let cards: Vec<bool> = CARD_COUNTS
            .iter()
            .flat_map(|&(flag, e, r)| std::iter::repeat(flag).take(pick(e, r)))
            .collect();
        assert_eq!(geographies.len(), cards.len());

        for (geography, card) in geographies.into_iter().zip(cards) {
            let index = records.len();
            records.push(record(index, geography, card, outcome));
        }
    }

    records
}

pub fn reference_churn_frame() -> DataFrame {
    records_to_frame(&reference_churn_records()).unwrap()
}

/// Seeded synthetic churn data with a strong geography and age effect
pub fn synthetic_churn_records(rows: usize, seed: u64) -> Vec<CustomerRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let geographies = ["France", "Germany", "Spain"];

    (0..rows)
        .map(|index| {
            let geography = geographies[rng.gen_range(0..3)];
            let age: i64 = rng.gen_range(20..80);
            let is_active_member = rng.gen_bool(0.5);

            let mut p_exit = 0.10;
            if geography == "Germany" {
                p_exit += 0.25;
            }
            if age > 45 {
                p_exit += 0.25;
            }
            if !is_active_member {
                p_exit += 0.05;
            }
            let outcome = if rng.gen_bool(p_exit) {
                Outcome::Exited
            } else {
                Outcome::Retained
            };

            let i = index as i64;
            CustomerRecord {
                row_number: i + 1,
                customer_id: 15_600_000 + i,
                surname: format!("Surname{}", rng.gen_range(0..500)),
                credit_score: rng.gen_range(350..=850),
                geography: geography.to_string(),
                gender: if rng.gen_bool(0.5) { "Female" } else { "Male" }.to_string(),
                age,
                tenure: rng.gen_range(0..=10),
                balance: if rng.gen_bool(0.3) {
                    0.0
                } else {
                    rng.gen_range(1_000.0..240_000.0)
                },
                num_of_products: rng.gen_range(1..=3),
                has_cr_card: rng.gen_bool(0.7),
                is_active_member,
                estimated_salary: rng.gen_range(100.0..199_000.0),
                outcome,
            }
        })
        .collect()
}

pub fn synthetic_churn_frame(rows: usize, seed: u64) -> DataFrame {
    records_to_frame(&synthetic_churn_records(rows, seed)).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("churn.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
