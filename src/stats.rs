//! Statistical utility functions shared across modules
//!
//! Contains the linear-interpolation quantile used by the filter engine,
//! the descriptive summaries and the boxplot view, plus small helpers for
//! per-row statistics that ignore missing (`NaN`) cells.

use statrs::statistics::Statistics;

/// Linear-interpolation quantile of already sorted data (R type 7, numpy "linear")
///
/// h = (n - 1) * p, result = x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])
///
/// `p` is clamped to [0, 1]. Returns `NaN` for empty input.
pub fn quantile_sorted(sorted_x: &[f64], p: f64) -> f64 {
    let n = sorted_x.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_x[0];
    }

    let p = p.clamp(0.0, 1.0);
    let h = (n as f64 - 1.0) * p;
    let h_floor = h.floor() as usize;
    let h_ceil = h.ceil() as usize;

    let lo = h_floor.min(n - 1);
    let hi = h_ceil.min(n - 1);

    if lo == hi {
        sorted_x[lo]
    } else {
        let frac = h - h_floor as f64;
        sorted_x[lo] + frac * (sorted_x[hi] - sorted_x[lo])
    }
}

/// Percentile (0-100) of unsorted data, skipping non-finite values
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    let sorted = sorted_finite(values);
    quantile_sorted(&sorted, pct / 100.0)
}

/// Copy the finite values and sort them ascending
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Sample variance (n - 1 denominator) of the finite values.
///
/// `NaN` when fewer than two finite values are present.
pub fn sample_variance<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>()
        .variance()
}

/// Mean and sample standard deviation of the finite values.
///
/// `None` when no value is finite; the deviation is 0 for a single value.
pub fn finite_mean_sd<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let finite: Vec<f64> = values.into_iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let mean = finite.iter().mean();
    let sd = if finite.len() > 1 { finite.iter().std_dev() } else { 0.0 };
    Some((mean, sd))
}

/// Number of strictly positive values
pub fn count_positive<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().filter(|&&v| v > 0.0).count()
}

/// Number of exact zeros
pub fn count_zeros<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().filter(|&&v| v == 0.0).count()
}

/// Median of the finite values, `NaN` if none
pub fn median<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    let collected: Vec<f64> = values.into_iter().copied().collect();
    quantile_sorted(&sorted_finite(&collected), 0.5)
}

/// Five-number summary plus mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Descriptive {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub sd: f64,
}

impl Descriptive {
    /// Describe the finite values of `values`; `None` if there are none
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_finite(values);
        if sorted.is_empty() {
            return None;
        }

        Some(Self {
            n: sorted.len(),
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            mean: sorted.iter().mean(),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            // NaN for a single observation, as with any sample statistic
            sd: sorted.iter().std_dev(),
        })
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_sorted_interpolates() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&x, 0.5), 3.0);
        assert_eq!(quantile_sorted(&x, 0.0), 1.0);
        assert_eq!(quantile_sorted(&x, 1.0), 5.0);
        assert!((quantile_sorted(&x, 0.1) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_edge_cases() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[7.0], 0.9), 7.0);
        assert_eq!(quantile_sorted(&[1.0, 3.0], 2.0), 3.0);
    }

    #[test]
    fn test_percentile_of_two_values() {
        // threshold halfway between 2 and 10
        assert_eq!(percentile(&[10.0, 2.0], 50.0), 6.0);
        assert_eq!(percentile(&[10.0, f64::NAN, 2.0], 100.0), 10.0);
    }

    #[test]
    fn test_finite_mean_sd() {
        let (mean, sd) = finite_mean_sd(&[2.0, f64::NAN, 4.0, 6.0]).unwrap();
        assert!((mean - 4.0).abs() < 1e-12);
        assert!((sd - 2.0).abs() < 1e-12);
        assert_eq!(finite_mean_sd(&[5.0]), Some((5.0, 0.0)));
        assert!(finite_mean_sd(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_sample_variance_skips_missing() {
        let v = [2.0, 4.0, f64::NAN, 6.0];
        assert!((sample_variance(&v) - 4.0).abs() < 1e-12);
        assert!(sample_variance(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_counts_and_median() {
        let v = [0.0, 3.0, 0.0, 1.5, 2.0];
        assert_eq!(count_positive(&v), 3);
        assert_eq!(count_zeros(&v), 2);
        assert_eq!(median(&v), 1.5);
    }

    #[test]
    fn test_descriptive() {
        let d = Descriptive::from_values(&[4.0, 1.0, 3.0, 2.0, f64::NAN]).unwrap();
        assert_eq!(d.n, 4);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 4.0);
        assert_eq!(d.median, 2.5);
        assert_eq!(d.mean, 2.5);
        assert!((d.q1 - 1.75).abs() < 1e-12);
        assert!((d.iqr() - 1.5).abs() < 1e-12);
        assert!(Descriptive::from_values(&[f64::NAN]).is_none());
    }
}
