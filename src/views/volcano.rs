//! Differential-expression views: volcano points and table rows

use serde::Serialize;

use crate::io::{DeResults, DeRow};

/// One gene on the volcano plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoPoint {
    pub gene_id: String,
    pub log2_fold_change: f64,
    /// `-log10(padj)`; a padj of zero is floored at the smallest positive f64
    pub neg_log10_padj: f64,
    pub significant: bool,
}

/// Volcano points for every gene with a finite fold change and a padj in [0, 1]
pub fn volcano_points(results: &DeResults, alpha: f64) -> Vec<VolcanoPoint> {
    let points: Vec<VolcanoPoint> = (0..results.n_genes())
        .filter(|&i| results.log2_fold_changes[i].is_finite() && (0.0..=1.0).contains(&results.padj[i]))
        .map(|i| VolcanoPoint {
            gene_id: results.gene_ids[i].clone(),
            log2_fold_change: results.log2_fold_changes[i],
            neg_log10_padj: -results.padj[i].max(f64::MIN_POSITIVE).log10(),
            significant: results.is_significant(i, alpha),
        })
        .collect();

    log::debug!(
        "Volcano: {} of {} genes plotted (padj < {})",
        points.len(),
        results.n_genes(),
        alpha
    );
    points
}

/// Rows of the DE table; only significant rows when `significant_only`
pub fn de_table_rows(results: &DeResults, alpha: f64, significant_only: bool) -> Vec<DeRow> {
    if significant_only {
        results.significant_rows(alpha)
    } else {
        (0..results.n_genes()).map(|i| results.row(i)).collect()
    }
}
