//! Rank and linear correlation with two-sided significance tests.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Significance threshold for p-values.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Fewest paired observations a coefficient is computed from.
pub const MIN_PAIRS: usize = 3;

/// A correlation coefficient and its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
}

impl Correlation {
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }

    fn from_coefficient(coefficient: f64, n: usize) -> Option<Self> {
        if !coefficient.is_finite() {
            return None;
        }
        let coefficient = coefficient.clamp(-1.0, 1.0);
        Some(Self {
            coefficient,
            p_value: p_value(coefficient, n)?,
        })
    }
}

/// Pearson product-moment correlation.
///
/// `None` with fewer than [`MIN_PAIRS`] pairs or when either side is
/// constant.
#[must_use]
pub fn pearson(pairs: &[(f64, f64)]) -> Option<Correlation> {
    if pairs.len() < MIN_PAIRS {
        return None;
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    Correlation::from_coefficient(coefficient(&xs, &ys)?, pairs.len())
}

/// Spearman rank correlation: Pearson over average ranks.
#[must_use]
pub fn spearman(pairs: &[(f64, f64)]) -> Option<Correlation> {
    if pairs.len() < MIN_PAIRS {
        return None;
    }
    let xs = ranks(&pairs.iter().map(|p| p.0).collect::<Vec<_>>());
    let ys = ranks(&pairs.iter().map(|p| p.1).collect::<Vec<_>>());
    Correlation::from_coefficient(coefficient(&xs, &ys)?, pairs.len())
}

/// 1-based ranks; tied values share the average of their positions.
#[must_use]
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let average = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = average;
        }
        start = end;
    }
    ranks
}

/// Least-squares line `y = slope * x + intercept`.
///
/// `None` with fewer than two points or when every `x` is equal.
#[must_use]
pub fn linear_fit(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    if pairs.len() < 2 {
        return None;
    }
    let mean_x = pairs.iter().map(|p| p.0).mean();
    let mean_y = pairs.iter().map(|p| p.1).mean();
    let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

fn coefficient(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Two-sided p-value of `r` under Student's t with `n - 2` degrees of
/// freedom.
fn p_value(r: f64, n: usize) -> Option<f64> {
    if r.abs() >= 1.0 {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}
