//! Customer records and the churn dataset column names

use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROW_NUMBER: &str = "RowNumber";
pub const CUSTOMER_ID: &str = "CustomerId";
pub const SURNAME: &str = "Surname";
pub const CREDIT_SCORE: &str = "CreditScore";
pub const GEOGRAPHY: &str = "Geography";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const TENURE: &str = "Tenure";
pub const BALANCE: &str = "Balance";
pub const NUM_OF_PRODUCTS: &str = "NumOfProducts";
pub const HAS_CR_CARD: &str = "HasCrCard";
pub const IS_ACTIVE_MEMBER: &str = "IsActiveMember";
pub const ESTIMATED_SALARY: &str = "EstimatedSalary";
pub const EXITED: &str = "Exited";

/// Binary churn outcome. `Exited` is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Retained,
    Exited,
}

impl Outcome {
    pub fn as_flag(self) -> i32 {
        match self {
            Outcome::Retained => 0,
            Outcome::Exited => 1,
        }
    }

    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(Outcome::Retained),
            1 => Some(Outcome::Exited),
            _ => None,
        }
    }
}

/// One row of the churn dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub row_number: i64,
    pub customer_id: i64,
    pub surname: String,
    pub credit_score: i64,
    pub geography: String,
    pub gender: String,
    pub age: i64,
    pub tenure: i64,
    pub balance: f64,
    pub num_of_products: i64,
    pub has_cr_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
    pub outcome: Outcome,
}

/// Build a dataset from records, preserving their order.
///
/// Flags and the outcome are written as 0/1 integers, matching the CSV layout.
pub fn records_to_frame(records: &[CustomerRecord]) -> PolarsResult<DataFrame> {
    let flag = |b: bool| b as i32;

    let columns = vec![
        Column::new(ROW_NUMBER.into(), records.iter().map(|r| r.row_number).collect::<Vec<_>>()),
        Column::new(CUSTOMER_ID.into(), records.iter().map(|r| r.customer_id).collect::<Vec<_>>()),
        Column::new(SURNAME.into(), records.iter().map(|r| r.surname.as_str()).collect::<Vec<_>>()),
        Column::new(CREDIT_SCORE.into(), records.iter().map(|r| r.credit_score).collect::<Vec<_>>()),
        Column::new(GEOGRAPHY.into(), records.iter().map(|r| r.geography.as_str()).collect::<Vec<_>>()),
        Column::new(GENDER.into(), records.iter().map(|r| r.gender.as_str()).collect::<Vec<_>>()),
        Column::new(AGE.into(), records.iter().map(|r| r.age).collect::<Vec<_>>()),
        Column::new(TENURE.into(), records.iter().map(|r| r.tenure).collect::<Vec<_>>()),
        Column::new(BALANCE.into(), records.iter().map(|r| r.balance).collect::<Vec<_>>()),
        Column::new(
            NUM_OF_PRODUCTS.into(),
            records.iter().map(|r| r.num_of_products).collect::<Vec<_>>(),
        ),
        Column::new(
            HAS_CR_CARD.into(),
            records.iter().map(|r| flag(r.has_cr_card)).collect::<Vec<_>>(),
        ),
        Column::new(
            IS_ACTIVE_MEMBER.into(),
            records.iter().map(|r| flag(r.is_active_member)).collect::<Vec<_>>(),
        ),
        Column::new(
            ESTIMATED_SALARY.into(),
            records.iter().map(|r| r.estimated_salary).collect::<Vec<_>>(),
        ),
        Column::new(EXITED.into(), records.iter().map(|r| r.outcome.as_flag()).collect::<Vec<_>>()),
    ];

    DataFrame::new(columns)
}
