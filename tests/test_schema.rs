//! Tests for schema validation

mod common;

use churnsig::pipeline::{
    load_dataset, records_to_frame, validate_schema, ExpectedSchema, PipelineError, AGE,
    GEOGRAPHY, HAS_CR_CARD, TENURE,
};
use common::{create_temp_csv, reference_churn_records};
use polars::prelude::*;

fn small_frame() -> DataFrame {
    records_to_frame(&reference_churn_records()[..20]).unwrap()
}

#[test]
fn test_reference_frame_is_valid() {
    let df = small_frame();
    let validated = validate_schema(&df, &ExpectedSchema::churn()).unwrap();
    assert_eq!(validated.height(), 20);
}

#[test]
fn test_csv_round_trip_is_valid() {
    let mut df = small_frame();
    let (_dir, path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 10_000).unwrap();
    assert!(validate_schema(&loaded, &ExpectedSchema::churn()).is_ok());
}

#[test]
fn test_missing_field_is_reported() {
    let df = small_frame().drop(TENURE).unwrap();

    match validate_schema(&df, &ExpectedSchema::churn()) {
        Err(PipelineError::Schema { missing, .. }) => assert_eq!(missing, vec![TENURE]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_type_mismatch_is_reported() {
    let mut df = small_frame();
    let ages: Vec<String> = (0..20).map(|i| format!("{}", 30 + i)).collect();
    df.with_column(Column::new(AGE.into(), ages)).unwrap();

    match validate_schema(&df, &ExpectedSchema::churn()) {
        Err(PipelineError::Schema { missing, mismatched }) => {
            assert!(missing.is_empty());
            assert_eq!(mismatched.len(), 1);
            assert!(mismatched[0].starts_with(AGE));
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_sentinel_value_is_a_null_violation() {
    let mut df = small_frame();
    let geography: Vec<&str> = (0..20)
        .map(|i| if i == 3 { "missing" } else { "France" })
        .collect();
    df.with_column(Column::new(GEOGRAPHY.into(), geography)).unwrap();

    match validate_schema(&df, &ExpectedSchema::churn()) {
        Err(PipelineError::NullValue { violations }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, GEOGRAPHY);
            assert_eq!(violations[0].row, 3);
        }
        other => panic!("expected null violation, got {:?}", other),
    }
}

#[test]
fn test_sentinel_match_ignores_case_and_whitespace() {
    let mut df = small_frame();
    let geography: Vec<&str> = (0..20)
        .map(|i| match i {
            5 => " MISSING ",
            9 => "",
            _ => "Spain",
        })
        .collect();
    df.with_column(Column::new(GEOGRAPHY.into(), geography)).unwrap();

    match validate_schema(&df, &ExpectedSchema::churn()) {
        Err(PipelineError::NullValue { violations }) => {
            let rows: Vec<usize> = violations.iter().map(|v| v.row).collect();
            assert_eq!(rows, vec![5, 9]);
        }
        other => panic!("expected null violation, got {:?}", other),
    }
}

#[test]
fn test_native_nulls_are_ordered_by_row() {
    let mut df = small_frame();
    let tenure: Vec<Option<i64>> = (0..20).map(|i| if i % 7 == 6 { None } else { Some(2) }).collect();
    let age: Vec<Option<i64>> = (0..20).map(|i| if i == 2 { None } else { Some(40) }).collect();
    df.with_column(Column::new(TENURE.into(), tenure)).unwrap();
    df.with_column(Column::new(AGE.into(), age)).unwrap();

    match validate_schema(&df, &ExpectedSchema::churn()) {
        Err(PipelineError::NullValue { violations }) => {
            let rows: Vec<usize> = violations.iter().map(|v| v.row).collect();
            assert_eq!(rows, vec![2, 6, 13]);
            assert_eq!(violations[0].field, AGE);
        }
        other => panic!("expected null violation, got {:?}", other),
    }
}

#[test]
fn test_binary_flag_outside_domain() {
    let mut df = small_frame();
    let flags: Vec<i32> = (0..20).map(|i| if i == 4 { 2 } else { 1 }).collect();
    df.with_column(Column::new(HAS_CR_CARD.into(), flags)).unwrap();

    let err = validate_schema(&df, &ExpectedSchema::churn()).unwrap_err();
    assert!(matches!(err, PipelineError::Schema { .. }));
    assert!(err.to_string().contains(HAS_CR_CARD));
}

#[test]
fn test_extra_columns_are_allowed() {
    let mut df = small_frame();
    df.with_column(Column::new("Notes".into(), vec!["x"; 20])).unwrap();
    assert!(validate_schema(&df, &ExpectedSchema::churn()).is_ok());
}

#[test]
fn test_custom_sentinels() {
    let mut schema = ExpectedSchema::churn();
    schema.null_sentinels = vec!["n/a".to_string()];

    let mut df = small_frame();
    let geography: Vec<&str> = (0..20).map(|i| if i == 0 { "N/A" } else { "missing" }).collect();
    df.with_column(Column::new(GEOGRAPHY.into(), geography)).unwrap();

    match validate_schema(&df, &schema) {
        Err(PipelineError::NullValue { violations }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].row, 0);
        }
        other => panic!("expected null violation, got {:?}", other),
    }
}
