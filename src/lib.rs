//! Churnsig: Feature Significance Library
//!
//! Validates a churn dataset, tests each candidate feature for association
//! with the outcome using Pearson's chi-squared test, and one-hot encodes
//! categorical columns with a round-trip count check.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
