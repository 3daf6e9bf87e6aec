//! Counts matrix representation for RNA-seq expression data

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::table::{Column, ColumnKind, TabularDataset};
use crate::error::{ExplorerError, Result};

/// A gene x sample matrix of (normalized) expression values
/// Rows are genes, columns are samples; missing cells are `NaN`
#[derive(Debug, Clone)]
pub struct CountsMatrix {
    /// Expression values (genes x samples)
    counts: Array2<f64>,
    /// Header of the gene identifier column, kept for writing back out
    id_column_name: String,
    /// Gene identifiers, as displayed
    gene_ids: Vec<String>,
    /// Sample identifiers
    sample_ids: Vec<String>,
}

impl CountsMatrix {
    /// Create a new counts matrix from raw data
    pub fn new(counts: Array2<f64>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (n_genes, n_samples) = counts.dim();

        if gene_ids.len() != n_genes {
            return Err(ExplorerError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(ExplorerError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        if counts.iter().any(|x| x.is_infinite()) {
            return Err(ExplorerError::InvalidTable {
                reason: "Counts must be finite values".to_string(),
            });
        }

        Ok(Self {
            counts,
            id_column_name: "gene".to_string(),
            gene_ids,
            sample_ids,
        })
    }

    /// Restrict a parsed table to its numeric columns.
    ///
    /// Categorical columns (gene symbols, descriptions) are dropped with a warning.
    pub fn from_table(table: &TabularDataset) -> Result<Self> {
        let numeric: Vec<(&String, &[f64])> = table
            .column_names()
            .iter()
            .zip(table.columns())
            .filter_map(|(name, column)| column.as_numeric().map(|v| (name, v)))
            .collect();

        let dropped = table.column_names_of_kind(ColumnKind::Categorical);
        if !dropped.is_empty() {
            log::warn!("Dropping non-numeric columns from counts matrix: {:?}", dropped);
        }

        if numeric.is_empty() {
            return Err(ExplorerError::EmptyData {
                reason: "Counts matrix has no numeric sample columns".to_string(),
            });
        }

        let n_genes = table.n_rows();
        let n_samples = numeric.len();
        let mut counts = Array2::zeros((n_genes, n_samples));
        for (j, (_, values)) in numeric.iter().enumerate() {
            for (i, &v) in values.iter().enumerate() {
                counts[[i, j]] = v;
            }
        }

        let sample_ids = numeric.iter().map(|(name, _)| (*name).clone()).collect();
        let mut matrix = Self::new(counts, table.row_ids().to_vec(), sample_ids)?;
        matrix.id_column_name = table.id_column_name().to_string();
        Ok(matrix)
    }

    /// Convert back to a table, e.g. for writing to disk
    pub fn to_table(&self) -> Result<TabularDataset> {
        let columns = self
            .counts
            .axis_iter(Axis(1))
            .map(|col| Column::Numeric(col.to_vec()))
            .collect();
        TabularDataset::new(
            self.id_column_name.clone(),
            self.gene_ids.clone(),
            self.sample_ids.clone(),
            columns,
        )
    }

    /// Get the number of genes
    pub fn n_genes(&self) -> usize {
        self.counts.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.counts.ncols()
    }

    /// Get the values as a view
    pub fn counts(&self) -> ArrayView2<'_, f64> {
        self.counts.view()
    }

    pub fn id_column_name(&self) -> &str {
        &self.id_column_name
    }

    /// Get gene IDs
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get values for a specific gene
    pub fn gene_counts(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.counts.row(gene_idx)
    }

    /// Get gene index by exact ID
    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    /// Subset to specific genes, keeping the given order
    pub fn subset_genes(&self, gene_indices: &[usize]) -> Result<Self> {
        let new_counts = self.counts.select(Axis(0), gene_indices);
        let new_gene_ids: Vec<String> = gene_indices
            .iter()
            .map(|&i| self.gene_ids[i].clone())
            .collect();

        let mut subset = Self::new(new_counts, new_gene_ids, self.sample_ids.clone())?;
        subset.id_column_name = self.id_column_name.clone();
        Ok(subset)
    }
}
