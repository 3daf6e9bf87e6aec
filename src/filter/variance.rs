//! Variance / non-zero filtering of a counts matrix
//!
//! A gene is kept when its sample variance is at least the requested
//! percentile of all gene variances and it is strictly positive in at least
//! `min_non_zero` samples. Genes with fewer than two observed values have no
//! variance and never pass.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::CountsMatrix;
use crate::error::{ExplorerError, Result};
use crate::stats::{count_positive, count_zeros, median, percentile, sample_variance};

/// Upper bound of both slider controls
pub const MAX_CRITERION: f64 = 100.0;

/// Thresholds applied by the filter engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Percentile of the variance distribution a gene must reach, in [0, 100]
    variance_percentile: f64,
    /// Minimum number of samples with a strictly positive value, in [0, 100]
    min_non_zero: usize,
}

impl FilterCriteria {
    pub fn new(variance_percentile: f64, min_non_zero: usize) -> Result<Self> {
        let criteria = Self {
            variance_percentile,
            min_non_zero,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    /// Check both thresholds are within the slider ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_CRITERION).contains(&self.variance_percentile) {
            return Err(ExplorerError::InvalidCriteria {
                reason: format!(
                    "variance percentile must be within [0, 100], got {}",
                    self.variance_percentile
                ),
            });
        }
        if self.min_non_zero as f64 > MAX_CRITERION {
            return Err(ExplorerError::InvalidCriteria {
                reason: format!(
                    "minimum non-zero samples must be within [0, 100], got {}",
                    self.min_non_zero
                ),
            });
        }
        Ok(())
    }

    pub fn variance_percentile(&self) -> f64 {
        self.variance_percentile
    }

    pub fn min_non_zero(&self) -> usize {
        self.min_non_zero
    }
}

/// Per-gene statistics the filter decisions are based on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowStats {
    /// Sample variance across finite values; `NaN` with fewer than two
    pub variance: f64,
    /// Samples with a strictly positive value
    pub non_zero: usize,
    /// Samples with an exact zero
    pub zeros: usize,
    /// Median across finite values
    pub median: f64,
}

impl RowStats {
    pub fn has_variance(&self) -> bool {
        self.variance.is_finite()
    }
}

/// Compute the statistics of every gene, in row order
pub fn row_stats(counts: &CountsMatrix) -> Vec<RowStats> {
    (0..counts.n_genes())
        .into_par_iter()
        .map(|i| {
            let row = counts.gene_counts(i);
            RowStats {
                variance: sample_variance(row.iter()),
                non_zero: count_positive(row.iter()),
                zeros: count_zeros(row.iter()),
                median: median(row.iter()),
            }
        })
        .collect()
}

/// Result of applying [`FilterCriteria`] to a counts matrix
#[derive(Debug, Clone)]
pub struct FilteredCountsMatrix {
    /// Retained genes, in input order
    matrix: CountsMatrix,
    /// Input row index of each retained gene
    kept: Vec<usize>,
    /// Whether each input row passed
    passed: Vec<bool>,
    /// Statistics of every input row
    stats: Vec<RowStats>,
    /// Gene ids of every input row
    all_gene_ids: Vec<String>,
    criteria: FilterCriteria,
    /// Variance value corresponding to the requested percentile
    variance_threshold: f64,
}

/// Apply the variance percentile and non-zero thresholds.
///
/// An empty result is valid. Repeated calls with the same input give the same
/// rows in the same order.
pub fn filter_counts(counts: &CountsMatrix, criteria: &FilterCriteria) -> Result<FilteredCountsMatrix> {
    let stats = row_stats(counts);

    let variances: Vec<f64> = stats.iter().map(|s| s.variance).collect();
    let variance_threshold = percentile(&variances, criteria.variance_percentile);

    let passed: Vec<bool> = stats
        .iter()
        .map(|s| s.has_variance() && s.variance >= variance_threshold && s.non_zero >= criteria.min_non_zero)
        .collect();
    let kept: Vec<usize> = passed
        .iter()
        .enumerate()
        .filter(|(_, &p)| p)
        .map(|(i, _)| i)
        .collect();

    log::info!(
        "Filter (variance >= {:.4} [p{}], non-zero >= {}): kept {} of {} genes",
        variance_threshold,
        criteria.variance_percentile,
        criteria.min_non_zero,
        kept.len(),
        counts.n_genes()
    );

    Ok(FilteredCountsMatrix {
        matrix: counts.subset_genes(&kept)?,
        kept,
        passed,
        stats,
        all_gene_ids: counts.gene_ids().to_vec(),
        criteria: *criteria,
        variance_threshold,
    })
}

impl FilteredCountsMatrix {
    /// Retained genes as a counts matrix
    pub fn matrix(&self) -> &CountsMatrix {
        &self.matrix
    }

    /// Input row index of each retained gene
    pub fn kept_indices(&self) -> &[usize] {
        &self.kept
    }

    /// Statistics of every input row
    pub fn row_stats(&self) -> &[RowStats] {
        &self.stats
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn variance_threshold(&self) -> f64 {
        self.variance_threshold
    }

    pub fn n_kept(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    /// Counts of passing and failing genes
    pub fn summary(&self) -> FilterSummary {
        let n_genes = self.stats.len();
        let n_passed = self.kept.len();
        let pct = |n: usize| {
            if n_genes == 0 {
                0.0
            } else {
                100.0 * n as f64 / n_genes as f64
            }
        };

        FilterSummary {
            n_samples: self.matrix.n_samples(),
            n_genes,
            n_passed,
            pct_passed: pct(n_passed),
            n_failed: n_genes - n_passed,
            pct_failed: pct(n_genes - n_passed),
        }
    }

    /// One point per input gene for the median-vs-variance and
    /// median-vs-zeros diagnostic plots
    pub fn diagnostic_points(&self) -> Vec<DiagnosticPoint> {
        self.all_gene_ids
            .iter()
            .zip(self.stats.iter().zip(self.passed.iter()))
            .map(|(gene_id, (s, &passed))| DiagnosticPoint {
                gene_id: gene_id.clone(),
                median: s.median,
                variance: s.variance,
                zeros: s.zeros,
                passed,
            })
            .collect()
    }
}

/// Pass/fail totals for the filter summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub n_samples: usize,
    pub n_genes: usize,
    pub n_passed: usize,
    pub pct_passed: f64,
    pub n_failed: usize,
    pub pct_failed: f64,
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Filter Summary")?;
        writeln!(f, "  Samples: {}", self.n_samples)?;
        writeln!(f, "  Genes:   {}", self.n_genes)?;
        writeln!(f, "  Passed:  {} ({:.1}%)", self.n_passed, self.pct_passed)?;
        writeln!(f, "  Failed:  {} ({:.1}%)", self.n_failed, self.pct_failed)?;
        Ok(())
    }
}

/// Per-gene point for the filter diagnostic scatter plots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticPoint {
    pub gene_id: String,
    pub median: f64,
    pub variance: f64,
    pub zeros: usize,
    pub passed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i + 1)).collect()
    }

    fn matrix(values: Array2<f64>, genes: &[&str]) -> CountsMatrix {
        let n_samples = values.ncols();
        CountsMatrix::new(values, genes.iter().map(|s| s.to_string()).collect(), ids("s", n_samples)).unwrap()
    }

    /// Rows with varied spread and sparsity
    fn mixed_matrix() -> CountsMatrix {
        matrix(
            array![
                [0.0, 0.0, 1.0, 0.0, 2.0, 0.0],
                [10.0, 12.0, 11.0, 9.0, 10.0, 13.0],
                [100.0, 5.0, 80.0, 0.0, 60.0, 20.0],
                [3.0, 3.0, 3.0, 3.0, 3.0, 3.0],
                [50.0, 0.0, 0.0, 40.0, 0.0, 45.0],
                [7.0, 8.0, f64::NAN, 6.0, 9.0, 7.5],
                [1.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN],
            ],
            &["sparse", "stable", "wild", "flat", "bimodal", "gappy", "single"],
        )
    }

    #[test]
    fn test_criteria_validation() {
        assert!(FilterCriteria::new(50.0, 5).is_ok());
        assert!(matches!(FilterCriteria::new(100.5, 0), Err(ExplorerError::InvalidCriteria { .. })));
        assert!(FilterCriteria::new(-1.0, 0).is_err());
        assert!(FilterCriteria::new(f64::NAN, 0).is_err());
        assert!(FilterCriteria::new(0.0, 101).is_err());
    }

    #[test]
    fn test_two_gene_scenario() {
        // GeneA: variance 10 over 8 positive samples (10 +/- sqrt(35), rest 10)
        let d = 35.0f64.sqrt();
        let gene_a = [10.0 + d, 10.0 - d, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        // GeneB: variance 2 with 3 positive samples (x^2 = 112 / 15)
        let x = (112.0f64 / 15.0).sqrt();
        let gene_b = [0.0, 0.0, 0.0, 0.0, 0.0, x, x, x];
        let values = Array2::from_shape_vec((2, 8), gene_a.iter().chain(gene_b.iter()).copied().collect()).unwrap();
        let counts = matrix(values, &["GeneA", "GeneB"]);

        let stats = row_stats(&counts);
        assert!((stats[0].variance - 10.0).abs() < 1e-9);
        assert!((stats[1].variance - 2.0).abs() < 1e-9);
        assert_eq!(stats[0].non_zero, 8);
        assert_eq!(stats[1].non_zero, 3);

        let criteria = FilterCriteria::new(50.0, 5).unwrap();
        let filtered = filter_counts(&counts, &criteria).unwrap();
        assert!((filtered.variance_threshold() - 6.0).abs() < 1e-9);
        assert_eq!(filtered.matrix().gene_ids(), &["GeneA".to_string()]);
    }

    #[test]
    fn test_zero_criteria_keep_all_defined_rows() {
        let counts = mixed_matrix();
        let filtered = filter_counts(&counts, &FilterCriteria::default()).unwrap();
        // "single" has one observed value and therefore no variance
        assert_eq!(filtered.kept_indices(), &[0, 1, 2, 3, 4, 5]);
        assert!(!filtered.row_stats()[6].has_variance());
    }

    #[test]
    fn test_hundredth_percentile_keeps_only_max_ties() {
        let counts = matrix(
            array![[1.0, 9.0], [0.0, 2.0], [1.0, 9.0], [4.0, 5.0]],
            &["a", "b", "c", "d"],
        );
        let filtered = filter_counts(&counts, &FilterCriteria::new(100.0, 0).unwrap()).unwrap();
        assert_eq!(filtered.kept_indices(), &[0, 2]);

        let single = filter_counts(&mixed_matrix(), &FilterCriteria::new(100.0, 0).unwrap()).unwrap();
        assert_eq!(single.matrix().gene_ids(), &["wild".to_string()]);
    }

    #[test]
    fn test_monotonic_in_both_thresholds() {
        let counts = mixed_matrix();
        let mut previous = usize::MAX;
        for pct in [0.0, 10.0, 25.0, 40.0, 50.0, 66.0, 80.0, 99.0, 100.0] {
            let n = filter_counts(&counts, &FilterCriteria::new(pct, 0).unwrap()).unwrap().n_kept();
            assert!(n <= previous, "raising percentile to {} increased kept rows", pct);
            previous = n;
        }

        let mut previous = usize::MAX;
        for min_non_zero in 0..=7 {
            let n = filter_counts(&counts, &FilterCriteria::new(20.0, min_non_zero).unwrap())
                .unwrap()
                .n_kept();
            assert!(n <= previous, "raising non-zero minimum to {} increased kept rows", min_non_zero);
            previous = n;
        }
    }

    #[test]
    fn test_deterministic_and_order_preserving() {
        let counts = mixed_matrix();
        let criteria = FilterCriteria::new(30.0, 3).unwrap();
        let first = filter_counts(&counts, &criteria).unwrap();
        for _ in 0..5 {
            let again = filter_counts(&counts, &criteria).unwrap();
            assert_eq!(again.kept_indices(), first.kept_indices());
            assert_eq!(again.matrix().gene_ids(), first.matrix().gene_ids());
        }
        assert!(first.kept_indices().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_result_is_valid() {
        let counts = mixed_matrix();
        let filtered = filter_counts(&counts, &FilterCriteria::new(0.0, 100).unwrap()).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.matrix().n_genes(), 0);
        assert_eq!(filtered.matrix().n_samples(), 6);

        let summary = filtered.summary();
        assert_eq!(summary.n_genes, 7);
        assert_eq!(summary.n_failed, 7);
        assert_eq!(summary.pct_failed, 100.0);
    }

    #[test]
    fn test_summary_and_diagnostics() {
        let counts = mixed_matrix();
        let filtered = filter_counts(&counts, &FilterCriteria::new(50.0, 0).unwrap()).unwrap();
        let summary = filtered.summary();
        assert_eq!(summary.n_samples, 6);
        assert_eq!(summary.n_passed + summary.n_failed, 7);
        assert!((summary.pct_passed + summary.pct_failed - 100.0).abs() < 1e-9);

        let points = filtered.diagnostic_points();
        assert_eq!(points.len(), 7);
        assert_eq!(points[3].gene_id, "flat");
        assert_eq!(points[3].variance, 0.0);
        assert_eq!(points[0].zeros, 4);
        assert_eq!(points.iter().filter(|p| p.passed).count(), summary.n_passed);
    }
}
