//! Equal-width histogram bins

use serde::Serialize;

use crate::stats::sorted_finite;

/// One histogram bar covering `[start, end)`; the last bin also includes `end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Bin the finite values into `n_bins` equal-width bins spanning their range.
///
/// No finite values yields no bins; a constant column yields a single bin.
pub fn histogram(values: &[f64], n_bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() || n_bins == 0 {
        return Vec::new();
    }

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / n_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|b| HistogramBin {
            start: min + width * b as f64,
            end: if b + 1 == n_bins { max } else { min + width * (b + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in sorted {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }

    bins
}
