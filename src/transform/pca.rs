//! Principal component analysis of samples
//!
//! The filtered counts matrix (genes x samples) is transposed so samples are
//! observations, genes are centred (and optionally scaled), and the scores are
//! taken from the thin SVD: X = U S V', scores = U S.

use nalgebra::DMatrix;
use ndarray::Array2;
use serde::Serialize;

use crate::data::CountsMatrix;
use crate::error::{ExplorerError, Result};
use crate::stats::finite_mean_sd;

/// Principal component scores of every sample
#[derive(Debug, Clone)]
pub struct PcaResult {
    /// Sample identifiers, one per score row
    pub sample_ids: Vec<String>,
    /// Scores (samples x components)
    pub scores: Array2<f64>,
    /// Percent of total variance carried by each component
    pub percent_variance: Vec<f64>,
    /// Singular values, descending
    pub singular_values: Vec<f64>,
}

/// One sample on a two-component scatter plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaPoint {
    pub sample_id: String,
    pub x: f64,
    pub y: f64,
}

/// Compute principal components of the samples of `counts`.
///
/// Missing cells are replaced by the gene mean. With `scale`, genes are divided
/// by their standard deviation; constant genes are left at zero.
/// Fails with `InsufficientData` for fewer than two samples or two genes.
pub fn pca(counts: &CountsMatrix, scale: bool) -> Result<PcaResult> {
    let n_genes = counts.n_genes();
    let n_samples = counts.n_samples();

    if n_samples < 2 || n_genes < 2 {
        return Err(ExplorerError::InsufficientData {
            operation: "PCA".to_string(),
            reason: format!(
                "need at least 2 samples and 2 genes, got {} samples and {} genes",
                n_samples, n_genes
            ),
        });
    }

    let values = counts.counts();
    let mut x = DMatrix::<f64>::zeros(n_samples, n_genes);
    for g in 0..n_genes {
        let row = values.row(g);
        let Some((mean, sd)) = finite_mean_sd(row.iter()) else {
            continue;
        };

        for s in 0..n_samples {
            let v = row[s];
            if !v.is_finite() {
                continue;
            }
            let centred = v - mean;
            x[(s, g)] = if scale {
                if sd > 0.0 {
                    centred / sd
                } else {
                    0.0
                }
            } else {
                centred
            };
        }
    }

    let svd = x.svd(true, false);
    let u = svd.u.ok_or_else(|| ExplorerError::InsufficientData {
        operation: "PCA".to_string(),
        reason: "SVD did not produce left singular vectors".to_string(),
    })?;
    let sigma = svd.singular_values;

    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|&a, &b| sigma[b].total_cmp(&sigma[a]));

    let n_components = order.len();
    let mut scores = Array2::zeros((n_samples, n_components));
    for (k, &c) in order.iter().enumerate() {
        for s in 0..n_samples {
            scores[[s, k]] = u[(s, c)] * sigma[c];
        }

        // sign convention: the largest-magnitude score is positive
        let column = scores.column(k);
        let pivot = column
            .iter()
            .copied()
            .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            scores.column_mut(k).mapv_inplace(|v| -v);
        }
    }

    let singular_values: Vec<f64> = order.iter().map(|&c| sigma[c]).collect();
    let total: f64 = singular_values.iter().map(|s| s * s).sum();
    let percent_variance = singular_values
        .iter()
        .map(|s| if total > 0.0 { 100.0 * s * s / total } else { 0.0 })
        .collect::<Vec<_>>();

    log::info!(
        "PCA on {} samples x {} genes: PC1 {:.1}%, PC2 {:.1}%",
        n_samples,
        n_genes,
        percent_variance[0],
        percent_variance.get(1).copied().unwrap_or(0.0)
    );

    Ok(PcaResult {
        sample_ids: counts.sample_ids().to_vec(),
        scores,
        percent_variance,
        singular_values,
    })
}

impl PcaResult {
    pub fn n_components(&self) -> usize {
        self.scores.ncols()
    }

    /// Scores of two components, 1-based (`projection(1, 2)` is PC1 vs PC2)
    pub fn projection(&self, pc_x: usize, pc_y: usize) -> Result<Vec<PcaPoint>> {
        let n = self.n_components();
        for pc in [pc_x, pc_y] {
            if pc == 0 || pc > n {
                return Err(ExplorerError::InvalidInput {
                    reason: format!("component PC{} not available, have PC1..PC{}", pc, n),
                });
            }
        }

        Ok(self
            .sample_ids
            .iter()
            .enumerate()
            .map(|(s, id)| PcaPoint {
                sample_id: id.clone(),
                x: self.scores[[s, pc_x - 1]],
                y: self.scores[[s, pc_y - 1]],
            })
            .collect())
    }

    /// PC1 vs PC2
    pub fn first_two(&self) -> Result<Vec<PcaPoint>> {
        self.projection(1, 2)
    }
}
