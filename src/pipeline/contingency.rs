//! Contingency tables of outcome counts per category or bin

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use serde::Serialize;

use super::record::Outcome;

/// Row index of positive (exited) counts
pub const POSITIVE_ROW: usize = 0;
/// Row index of negative (retained) counts
pub const NEGATIVE_ROW: usize = 1;

/// Per-key outcome counts, one map per outcome group.
///
/// A key only appears in a group's map if it was observed in that group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeCounts<K: Ord> {
    pub positive: BTreeMap<K, u64>,
    pub negative: BTreeMap<K, u64>,
}

impl<K: Ord> Default for OutcomeCounts<K> {
    fn default() -> Self {
        Self {
            positive: BTreeMap::new(),
            negative: BTreeMap::new(),
        }
    }
}

impl<K: Ord> OutcomeCounts<K> {
    /// Drop keys from both groups
    pub fn without(mut self, excluded: impl Fn(&K) -> bool) -> Self {
        self.positive.retain(|k, _| !excluded(k));
        self.negative.retain(|k, _| !excluded(k));
        self
    }

    pub fn total(&self) -> u64 {
        self.positive.values().sum::<u64>() + self.negative.values().sum::<u64>()
    }
}

/// Tally outcomes by key. Rows with a `None` key or outcome are skipped.
pub fn count_outcomes<K, I>(keys: I, outcomes: &[Option<Outcome>]) -> OutcomeCounts<K>
where
    K: Ord,
    I: IntoIterator<Item = Option<K>>,
{
    let mut counts = OutcomeCounts::default();

    for (key, outcome) in keys.into_iter().zip(outcomes.iter()) {
        let (Some(key), Some(outcome)) = (key, outcome) else {
            continue;
        };
        let group = match outcome {
            Outcome::Exited => &mut counts.positive,
            Outcome::Retained => &mut counts.negative,
        };
        *group.entry(key).or_insert(0) += 1;
    }

    counts
}

/// A 2×k table: row 0 positive counts, row 1 negative counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    labels: Vec<String>,
    positive: Vec<u64>,
    negative: Vec<u64>,
}

impl ContingencyTable {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn num_columns(&self) -> usize {
        self.labels.len()
    }

    pub fn observed(&self, row: usize, col: usize) -> u64 {
        match row {
            POSITIVE_ROW => self.positive[col],
            _ => self.negative[col],
        }
    }

    pub fn row(&self, row: usize) -> &[u64] {
        match row {
            POSITIVE_ROW => &self.positive,
            _ => &self.negative,
        }
    }

    pub fn row_totals(&self) -> [u64; 2] {
        [self.positive.iter().sum(), self.negative.iter().sum()]
    }

    pub fn column_totals(&self) -> Vec<u64> {
        self.positive
            .iter()
            .zip(&self.negative)
            .map(|(p, n)| p + n)
            .collect()
    }

    pub fn grand_total(&self) -> u64 {
        let [p, n] = self.row_totals();
        p + n
    }
}

/// Outer-join two count maps into a table labelled by `Display` of the key
pub fn build_contingency_table<K>(
    positive: &BTreeMap<K, u64>,
    negative: &BTreeMap<K, u64>,
) -> ContingencyTable
where
    K: Ord + Display,
{
    build_labeled_table(positive, negative, |k| k.to_string())
}

/// Outer-join two count maps; keys missing on one side become zero.
///
/// Columns follow key order, so bins stay in interval order and string
/// labels sort lexicographically.
pub fn build_labeled_table<K, F>(
    positive: &BTreeMap<K, u64>,
    negative: &BTreeMap<K, u64>,
    label: F,
) -> ContingencyTable
where
    K: Ord,
    F: Fn(&K) -> String,
{
    let keys: BTreeSet<&K> = positive.keys().chain(negative.keys()).collect();

    let mut table = ContingencyTable {
        labels: Vec::with_capacity(keys.len()),
        positive: Vec::with_capacity(keys.len()),
        negative: Vec::with_capacity(keys.len()),
    };

    for key in keys {
        table.labels.push(label(key));
        table.positive.push(positive.get(key).copied().unwrap_or(0));
        table.negative.push(negative.get(key).copied().unwrap_or(0));
    }

    table
}
