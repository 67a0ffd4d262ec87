//! Sample statistics for metric distributions.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n − 1 denominator); zero for a single value.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linearly interpolated percentile of an ascending slice, `q` in [0, 1].
///
/// # Examples
///
/// ```
/// use dcf_core::math::statistics::percentile_sorted;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile_sorted(&sorted, 0.5), Some(3.0));
/// assert_eq!(percentile_sorted(&sorted, 0.125), Some(1.5));
/// ```
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Summary of a sampled distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of finite samples
    pub count: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// 5th percentile
    pub p5: f64,
    /// 25th percentile
    pub p25: f64,
    /// Median
    pub median: f64,
    /// 75th percentile
    pub p75: f64,
    /// 95th percentile
    pub p95: f64,
    /// Largest sample
    pub max: f64,
}

impl DistributionSummary {
    /// Summarise the finite values of `values`; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q = |p: f64| percentile_sorted(&sorted, p).unwrap_or(f64::NAN);
        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted)?,
            std_dev: std_dev(&sorted)?,
            min: sorted[0],
            p5: q(0.05),
            p25: q(0.25),
            median: q(0.50),
            p75: q(0.75),
            p95: q(0.95),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(std_dev(&values).unwrap(), (32.0f64 / 7.0).sqrt(), max_relative = 1e-12);
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[3.0]), Some(0.0));
    }

    #[test]
    fn test_percentile_endpoints() {
        let sorted = [10.0, 20.0, 30.0];
        assert_eq!(percentile_sorted(&sorted, 0.0), Some(10.0));
        assert_eq!(percentile_sorted(&sorted, 1.0), Some(30.0));
        assert_eq!(percentile_sorted(&sorted, 1.5), Some(30.0));
        assert_eq!(percentile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_summary_ignores_non_finite() {
        let values = [3.0, f64::NAN, 1.0, f64::INFINITY, 2.0];
        let summary = DistributionSummary::from_values(&values).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.median, 2.0);
        assert!(DistributionSummary::from_values(&[f64::NAN]).is_none());
    }
}
