//! Fixed-width discretization of continuous columns

use serde::Serialize;

use super::error::PipelineError;

/// Tolerance used when deciding whether the range divides evenly by the step
const EDGE_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of bins a fixed-width spec may produce
pub const MAX_BINS: usize = 1_000_000;

/// Monotonically increasing bin edges.
///
/// Bin `i` covers `[edges[i], edges[i + 1])`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSpec {
    edges: Vec<f64>,
}

impl BinSpec {
    /// Edges `lower, lower + step, ...` up to the first edge at or above `upper`.
    pub fn fixed_width(
        feature: &str,
        lower: f64,
        upper: f64,
        step: f64,
    ) -> Result<Self, PipelineError> {
        let invalid = || PipelineError::InvalidRange {
            feature: feature.to_string(),
            lower,
            upper,
            step,
        };

        if !lower.is_finite() || !upper.is_finite() || !step.is_finite() {
            return Err(invalid());
        }
        if lower >= upper || step <= 0.0 {
            return Err(invalid());
        }

        let raw = (upper - lower) / step;
        if !raw.is_finite() || raw > MAX_BINS as f64 {
            return Err(invalid());
        }
        let count = if (raw - raw.round()).abs() < EDGE_TOLERANCE {
            raw.round()
        } else {
            raw.ceil()
        };
        let count = (count as usize).max(1);

        // Multiply rather than accumulate so edges do not drift.
        let edges = (0..=count).map(|i| lower + i as f64 * step).collect();
        Ok(Self { edges })
    }

    /// Explicit edges; at least two, strictly increasing and finite.
    pub fn from_edges(feature: &str, edges: Vec<f64>) -> Result<Self, PipelineError> {
        let valid = edges.len() >= 2
            && edges.iter().all(|e| e.is_finite())
            && edges.windows(2).all(|w| w[0] < w[1]);
        if !valid {
            return Err(PipelineError::InvalidRange {
                feature: feature.to_string(),
                lower: edges.first().copied().unwrap_or(f64::NAN),
                upper: edges.last().copied().unwrap_or(f64::NAN),
                step: f64::NAN,
            });
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Index of the bin holding `value`, or `None` outside `[e0, en]`.
    pub fn assign(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value < first || value > last {
            return None;
        }
        if value == last {
            return Some(self.num_bins() - 1);
        }
        // Number of edges <= value, minus one, is the left edge index.
        Some(self.edges.partition_point(|e| *e <= value) - 1)
    }

    /// Human-readable interval label for bin `index`
    pub fn label(&self, index: usize) -> String {
        let lo = format_edge(self.edges[index]);
        let hi = format_edge(self.edges[index + 1]);
        if index + 1 == self.num_bins() {
            format!("[{}, {}]", lo, hi)
        } else {
            format!("[{}, {})", lo, hi)
        }
    }
}

fn format_edge(edge: f64) -> String {
    if edge.fract() == 0.0 {
        format!("{:.0}", edge)
    } else {
        format!("{}", edge)
    }
}

/// Bin assignment for every row of a column
#[derive(Debug, Clone)]
pub struct BinnedColumn {
    /// One entry per input row; `None` for nulls and out-of-range values
    pub assignments: Vec<Option<usize>>,
    /// Non-null values that fell outside the edges
    pub out_of_range: usize,
}

/// Assign each value of a column to its bin, preserving row order
pub fn bin_column(values: &[Option<f64>], spec: &BinSpec) -> BinnedColumn {
    let mut out_of_range = 0;
    let assignments = values
        .iter()
        .map(|v| match v {
            Some(value) => {
                let bin = spec.assign(*value);
                if bin.is_none() {
                    out_of_range += 1;
                }
                bin
            }
            None => None,
        })
        .collect();

    BinnedColumn {
        assignments,
        out_of_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_even_division() {
        let spec = BinSpec::fixed_width("Tenure", 0.0, 10.0, 1.0).unwrap();
        assert_eq!(spec.num_bins(), 10);
        assert_eq!(spec.edges()[0], 0.0);
        assert_eq!(spec.edges()[10], 10.0);
    }

    #[test]
    fn test_fixed_width_extends_past_upper() {
        let spec = BinSpec::fixed_width("Age", 18.0, 92.0, 5.0).unwrap();
        // 74 / 5 = 14.8 -> 15 bins, last edge 93
        assert_eq!(spec.num_bins(), 15);
        assert!((spec.edges()[15] - 93.0).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_step_does_not_drift() {
        let spec = BinSpec::fixed_width("x", 0.0, 1.0, 0.1).unwrap();
        assert_eq!(spec.num_bins(), 10);
        assert!((spec.edges()[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_assign_left_closed_right_open() {
        let spec = BinSpec::fixed_width("x", 0.0, 10.0, 5.0).unwrap();
        assert_eq!(spec.assign(0.0), Some(0));
        assert_eq!(spec.assign(4.999), Some(0));
        assert_eq!(spec.assign(5.0), Some(1));
        // Last interval is closed
        assert_eq!(spec.assign(10.0), Some(1));
        assert_eq!(spec.assign(10.001), None);
        assert_eq!(spec.assign(-0.1), None);
        assert_eq!(spec.assign(f64::NAN), None);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        assert!(matches!(
            BinSpec::fixed_width("x", 10.0, 10.0, 1.0),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(matches!(
            BinSpec::fixed_width("x", 10.0, 0.0, 1.0),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(matches!(
            BinSpec::fixed_width("x", 0.0, 10.0, 0.0),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(matches!(
            BinSpec::fixed_width("x", 0.0, 10.0, -1.0),
            Err(PipelineError::InvalidRange { .. })
        ));
        assert!(BinSpec::fixed_width("x", 0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_from_edges_requires_strictly_increasing() {
        assert!(BinSpec::from_edges("x", vec![0.0, 1.0, 3.0]).is_ok());
        assert!(BinSpec::from_edges("x", vec![0.0, 1.0, 1.0]).is_err());
        assert!(BinSpec::from_edges("x", vec![0.0]).is_err());
    }

    #[test]
    fn test_labels() {
        let spec = BinSpec::fixed_width("Balance", 0.0, 50_000.0, 25_000.0).unwrap();
        assert_eq!(spec.label(0), "[0, 25000)");
        assert_eq!(spec.label(1), "[25000, 50000]");
    }

    #[test]
    fn test_bin_column_counts_out_of_range() {
        let spec = BinSpec::fixed_width("x", 0.0, 10.0, 5.0).unwrap();
        let values = vec![Some(1.0), None, Some(7.0), Some(42.0)];
        let binned = bin_column(&values, &spec);
        assert_eq!(binned.assignments, vec![Some(0), None, Some(1), None]);
        assert_eq!(binned.out_of_range, 1);
    }
}
