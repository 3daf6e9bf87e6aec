//! Expression of one gene across samples, grouped by a metadata column
//!
//! Gene identifiers are looked up among the counts matrix rows; sample
//! identifiers from the metadata are matched against the counts matrix
//! columns. Both comparisons use the normalized identifier form.

use serde::Serialize;

use crate::cleaning::{clean_gene_ids, clean_sample_columns, clean_sample_ids};
use crate::data::{CountsMatrix, SampleInfo};
use crate::error::{ExplorerError, Result};
use crate::stats::{quantile_sorted, sorted_finite};

/// Group label used for samples with a missing grouping value
pub const MISSING_GROUP: &str = "NA";

fn group_label(level: &str) -> &str {
    if level.is_empty() {
        MISSING_GROUP
    } else {
        level
    }
}

/// One sample's value of the selected gene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionPoint {
    pub sample_id: String,
    pub group: String,
    pub value: f64,
}

/// Tukey boxplot statistics of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxplotStats {
    pub group: String,
    pub n: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within 1.5 IQR below Q1
    pub lower_whisker: f64,
    /// Largest value within 1.5 IQR above Q3
    pub upper_whisker: f64,
    /// Values beyond the whiskers
    pub outliers: Vec<f64>,
}

/// Boxplot statistics of the finite `values`; `None` if there are none
pub fn boxplot_stats(group: &str, values: &[f64]) -> Option<BoxplotStats> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return None;
    }

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (low_fence, high_fence) = (q1 - fence, q3 + fence);

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v >= low_fence && v <= high_fence)
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < low_fence || v > high_fence)
        .collect();

    Some(BoxplotStats {
        group: group.to_string(),
        n: sorted.len(),
        q1,
        median,
        q3,
        lower_whisker: inside.first().copied().unwrap_or(q1),
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Values of the selected gene, per sample and per group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneExpressionView {
    /// Gene identifier as displayed in the counts matrix
    pub gene_id: String,
    pub group_column: String,
    pub points: Vec<ExpressionPoint>,
    /// One box per level with matched samples, in level order (missing first)
    pub groups: Vec<BoxplotStats>,
}

/// Build the expression view of `gene` grouped by `group_column`.
///
/// Counts columns without a matching metadata row are left out. Fails with
/// `GeneNotFound` for an unknown gene and `IdentifierNotFound` when no counts
/// column matches a metadata sample identifier.
pub fn gene_expression(
    counts: &CountsMatrix,
    info: &SampleInfo,
    gene: &str,
    group_column: &str,
) -> Result<GeneExpressionView> {
    let gene_idx = clean_gene_ids(counts)
        .position(gene)
        .ok_or_else(|| ExplorerError::GeneNotFound {
            gene_id: gene.to_string(),
        })?;
    let groups_by_row = info.condition(group_column)?;

    let metadata_index = clean_sample_ids(info);
    let column_index = clean_sample_columns(counts);
    let values = counts.gene_counts(gene_idx);

    let mut points = Vec::with_capacity(counts.n_samples());
    // metadata row of each point
    let mut point_rows = Vec::with_capacity(counts.n_samples());
    let mut unmatched = Vec::new();
    for (j, sample_id) in counts.sample_ids().iter().enumerate() {
        if column_index.position(sample_id) != Some(j) {
            // duplicate column after normalization
            continue;
        }
        match metadata_index.position(sample_id) {
            Some(row) => {
                points.push(ExpressionPoint {
                    sample_id: sample_id.clone(),
                    group: group_label(&groups_by_row[row]).to_string(),
                    value: values[j],
                });
                point_rows.push(row);
            }
            None => unmatched.push(sample_id.as_str()),
        }
    }

    if points.is_empty() {
        return Err(ExplorerError::IdentifierNotFound {
            id: counts.sample_ids().first().cloned().unwrap_or_default(),
            space: format!("sample information column '{}'", info.id_column()),
        });
    }
    if !unmatched.is_empty() {
        log::warn!(
            "{} counts columns have no sample information row: {:?}",
            unmatched.len(),
            unmatched
        );
    }

    let mut groups = Vec::new();
    for level in info.levels(group_column)? {
        let rows = info.samples_with_level(group_column, &level);
        let level_values: Vec<f64> = point_rows
            .iter()
            .zip(points.iter())
            .filter(|(row, _)| rows.contains(*row))
            .map(|(_, p)| p.value)
            .collect();
        if let Some(stats) = boxplot_stats(group_label(&level), &level_values) {
            groups.push(stats);
        }
    }

    Ok(GeneExpressionView {
        gene_id: counts.gene_ids()[gene_idx].clone(),
        group_column: group_column.to_string(),
        points,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TabularDataset;
    use ndarray::array;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (CountsMatrix, SampleInfo) {
        let counts = CountsMatrix::new(
            array![
                [1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
                [5.0, 5.0, 5.0, 5.0, 5.0, 5.0],
            ],
            strings(&["ACTB ", "Gapdh"]),
            strings(&["S1", "S2", "S3", "S4", "S5", "extra"]),
        )
        .unwrap();
        let table = TabularDataset::from_raw(
            "row".to_string(),
            strings(&["1", "2", "3", "4", "5"]),
            strings(&["SampleID", "condition"]),
            vec![
                strings(&[" s1", "s2", "S3 ", "s4", "S5"]),
                strings(&["ctl", "ctl", "ctl", "trt", ""]),
            ],
        )
        .unwrap();
        (counts, SampleInfo::with_id_column(table, "SampleID").unwrap())
    }

    #[test]
    fn test_boxplot_stats() {
        let stats = boxplot_stats("g", &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(boxplot_stats("g", &[f64::NAN]).is_none());
    }

    #[test]
    fn test_gene_expression_joins_sample_columns() {
        let (counts, info) = fixture();
        let view = gene_expression(&counts, &info, "actb", "condition").unwrap();

        assert_eq!(view.gene_id, "ACTB ");
        assert_eq!(view.points.len(), 5);
        assert_eq!(view.points[3].group, "trt");
        assert_eq!(view.points[4].group, MISSING_GROUP);

        let labels: Vec<&str> = view.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(labels, vec![MISSING_GROUP, "ctl", "trt"]);
        assert_eq!(view.groups[1].n, 3);
        assert_eq!(view.groups[1].median, 2.0);
    }

    #[test]
    fn test_unknown_gene() {
        let (counts, info) = fixture();
        let err = gene_expression(&counts, &info, "TP53", "condition").unwrap_err();
        assert!(matches!(err, ExplorerError::GeneNotFound { ref gene_id } if gene_id == "TP53"));
    }

    #[test]
    fn test_gene_ids_are_not_sample_ids() {
        let (counts, _) = fixture();
        // metadata keyed by gene-like identifiers never matches sample columns
        let table = TabularDataset::from_raw(
            "gene".to_string(),
            strings(&["ACTB", "GAPDH"]),
            strings(&["condition"]),
            vec![strings(&["ctl", "trt"])],
        )
        .unwrap();
        let info = SampleInfo::new(table);
        let err = gene_expression(&counts, &info, "actb", "condition").unwrap_err();
        assert!(matches!(err, ExplorerError::IdentifierNotFound { .. }));
    }

    #[test]
    fn test_numeric_group_column_rejected() {
        let (counts, _) = fixture();
        let table = TabularDataset::from_raw(
            "sample".to_string(),
            strings(&["S1", "S2"]),
            strings(&["age"]),
            vec![strings(&["30", "40"])],
        )
        .unwrap();
        let info = SampleInfo::new(table);
        assert!(matches!(
            gene_expression(&counts, &info, "gapdh", "age"),
            Err(ExplorerError::InvalidInput { .. })
        ));
        assert!(matches!(
            gene_expression(&counts, &info, "gapdh", "batch"),
            Err(ExplorerError::MissingColumn { .. })
        ));
    }
}
