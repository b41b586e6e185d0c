//! Pearson's chi-squared test of independence
//!
//! The right-tail probability is computed in-crate from the regularized upper
//! incomplete gamma function: `P(X > x) = Q(dof / 2, x / 2)`.

use serde::{Deserialize, Serialize};

use super::contingency::ContingencyTable;
use super::error::{DegenerateReason, PipelineError};

/// Default significance threshold
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Relative convergence tolerance for the gamma series and continued fraction
const GAMMA_EPSILON: f64 = 1e-15;

/// Floor that keeps Lentz's method away from division by zero
const GAMMA_FPMIN: f64 = 1e-300;

const GAMMA_MAX_ITERATIONS: usize = 1000;

/// Lanczos approximation coefficients (g = 7, n = 9)
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Continuity correction policy for 2×2 tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continuity {
    /// Yates' correction on 1-dof tables; wider tables are never corrected
    #[default]
    Yates,
    /// Plain Pearson statistic everywhere
    None,
}

impl std::fmt::Display for Continuity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Continuity::Yates => write!(f, "yates"),
            Continuity::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for Continuity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yates" => Ok(Continuity::Yates),
            "none" => Ok(Continuity::None),
            _ => Err(format!("Unknown continuity correction: '{}'. Use 'yates' or 'none'.", s)),
        }
    }
}

/// Outcome of a chi-squared test on one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceResult {
    feature: String,
    statistic: f64,
    p_value: f64,
    degrees_of_freedom: usize,
    categories: Vec<String>,
    expected: [Vec<f64>; 2],
    alpha: f64,
    corrected: bool,
    significant: bool,
}

impl SignificanceResult {
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    /// Column labels of the tested table
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Expected frequencies, same 2×k shape as the observed table
    pub fn expected(&self) -> &[Vec<f64>; 2] {
        &self.expected
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether Yates' correction was applied
    pub fn corrected(&self) -> bool {
        self.corrected
    }

    pub fn significant(&self) -> bool {
        self.significant
    }
}

/// Check that a significance threshold lies strictly between 0 and 1
pub fn validate_alpha(alpha: f64) -> Result<(), PipelineError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )))
    }
}

/// Run the test of independence over a 2×k table.
///
/// Fails with `DegenerateTable` when a margin is zero, a category was seen in
/// only one outcome group, or fewer than two categories are present.
pub fn chi_square_test(
    feature: &str,
    table: &ContingencyTable,
    alpha: f64,
    continuity: Continuity,
) -> Result<SignificanceResult, PipelineError> {
    validate_alpha(alpha)?;
    check_degenerate(table).map_err(|reason| PipelineError::DegenerateTable {
        feature: feature.to_string(),
        reason,
    })?;

    let row_totals = table.row_totals();
    let column_totals = table.column_totals();
    let grand_total = table.grand_total() as f64;
    let k = table.num_columns();

    let degrees_of_freedom = k - 1;
    let corrected = continuity == Continuity::Yates && degrees_of_freedom == 1;

    let mut expected = [Vec::with_capacity(k), Vec::with_capacity(k)];
    let mut statistic = 0.0;

    for (row, row_total) in row_totals.iter().enumerate() {
        for (col, col_total) in column_totals.iter().enumerate() {
            let e = (*row_total as f64) * (*col_total as f64) / grand_total;
            let deviation = (table.observed(row, col) as f64 - e).abs();
            let deviation = if corrected {
                deviation - deviation.min(0.5)
            } else {
                deviation
            };
            statistic += deviation * deviation / e;
            expected[row].push(e);
        }
    }

    let p_value = chi_square_survival(statistic, degrees_of_freedom);

    Ok(SignificanceResult {
        feature: feature.to_string(),
        statistic,
        p_value,
        degrees_of_freedom,
        categories: table.labels().to_vec(),
        expected,
        alpha,
        corrected,
        significant: p_value < alpha,
    })
}

fn check_degenerate(table: &ContingencyTable) -> Result<(), DegenerateReason> {
    for (row, total) in table.row_totals().iter().enumerate() {
        if *total == 0 {
            return Err(DegenerateReason::ZeroRowTotal { row });
        }
    }

    for (col, total) in table.column_totals().iter().enumerate() {
        let label = table.labels()[col].clone();
        if *total == 0 {
            return Err(DegenerateReason::ZeroColumnTotal { label });
        }
        if table.observed(0, col) == 0 || table.observed(1, col) == 0 {
            return Err(DegenerateReason::OneSidedCategory { label });
        }
    }

    if table.num_columns() < 2 {
        return Err(DegenerateReason::SingleCategory);
    }

    Ok(())
}

/// Right-tail probability of the chi-squared distribution
pub fn chi_square_survival(statistic: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom == 0 {
        return 1.0;
    }
    regularized_upper_gamma(degrees_of_freedom as f64 / 2.0, statistic / 2.0).clamp(0.0, 1.0)
}

/// Natural log of the gamma function for `x > 0` (Lanczos)
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Q(a, x) = Γ(a, x) / Γ(a)
pub fn regularized_upper_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - lower_gamma_series(a, x)
    } else {
        upper_gamma_continued_fraction(a, x)
    }
}

/// P(a, x) by its power series; converges quickly for x < a + 1
fn lower_gamma_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;

    for _ in 0..GAMMA_MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPSILON {
            break;
        }
    }

    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Q(a, x) by modified Lentz continued fraction; used for x >= a + 1
fn upper_gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / GAMMA_FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..GAMMA_MAX_ITERATIONS {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;

        d = an * d + b;
        if d.abs() < GAMMA_FPMIN {
            d = GAMMA_FPMIN;
        }
        c = b + an / c;
        if c.abs() < GAMMA_FPMIN {
            c = GAMMA_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPSILON {
            break;
        }
    }

    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}
