//! Differential-expression results table

use serde::Serialize;

use crate::data::TabularDataset;
use crate::error::{ExplorerError, Result};

/// Required column holding the log2 fold change
pub const LOG2_FOLD_CHANGE: &str = "log2FoldChange";
/// Required column holding the raw p-value
pub const PVALUE: &str = "pvalue";
/// Required column holding the adjusted p-value
pub const PADJ: &str = "padj";

/// Differential-expression statistics per gene, as uploaded
#[derive(Debug, Clone)]
pub struct DeResults {
    /// Gene identifiers
    pub gene_ids: Vec<String>,
    /// Log2 fold change
    pub log2_fold_changes: Vec<f64>,
    /// Raw p-values
    pub pvalues: Vec<f64>,
    /// Adjusted p-values
    pub padj: Vec<f64>,
    /// Full uploaded table, including optional columns such as baseMean or lfcSE
    table: TabularDataset,
}

/// One row of the DE table as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeRow {
    pub gene_id: String,
    pub log2_fold_change: f64,
    pub pvalue: f64,
    pub padj: f64,
}

impl DeResults {
    /// Validate the required columns of an uploaded table
    pub fn from_table(table: TabularDataset) -> Result<Self> {
        let log2_fold_changes = required_numeric(&table, LOG2_FOLD_CHANGE)?;
        let pvalues = required_numeric(&table, PVALUE)?;
        let padj = required_numeric(&table, PADJ)?;

        let out_of_range = pvalues
            .iter()
            .chain(padj.iter())
            .filter(|p| !(0.0..=1.0).contains(*p))
            .count();
        if out_of_range > 0 {
            log::warn!(
                "{} p-values are missing or outside [0, 1]; those rows are never significant",
                out_of_range
            );
        }

        Ok(Self {
            gene_ids: table.row_ids().to_vec(),
            log2_fold_changes,
            pvalues,
            padj,
            table,
        })
    }

    /// Get number of genes
    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    /// Full uploaded table
    pub fn table(&self) -> &TabularDataset {
        &self.table
    }

    /// Whether row `i` is significant at `padj < alpha`
    pub fn is_significant(&self, i: usize, alpha: f64) -> bool {
        let p = self.padj[i];
        (0.0..=1.0).contains(&p) && p < alpha
    }

    /// Get significant genes at given alpha level
    pub fn significant_genes(&self, alpha: f64) -> Vec<&str> {
        (0..self.n_genes())
            .filter(|&i| self.is_significant(i, alpha))
            .map(|i| self.gene_ids[i].as_str())
            .collect()
    }

    /// Get up-regulated genes (positive log2FC, significant)
    pub fn upregulated_genes(&self, alpha: f64, min_lfc: f64) -> Vec<&str> {
        (0..self.n_genes())
            .filter(|&i| self.is_significant(i, alpha) && self.log2_fold_changes[i] > min_lfc)
            .map(|i| self.gene_ids[i].as_str())
            .collect()
    }

    /// Get down-regulated genes (negative log2FC, significant)
    pub fn downregulated_genes(&self, alpha: f64, min_lfc: f64) -> Vec<&str> {
        (0..self.n_genes())
            .filter(|&i| self.is_significant(i, alpha) && self.log2_fold_changes[i] < -min_lfc)
            .map(|i| self.gene_ids[i].as_str())
            .collect()
    }

    /// Row `i` as a table row
    pub fn row(&self, i: usize) -> DeRow {
        DeRow {
            gene_id: self.gene_ids[i].clone(),
            log2_fold_change: self.log2_fold_changes[i],
            pvalue: self.pvalues[i],
            padj: self.padj[i],
        }
    }

    /// Rows passing `padj < alpha`, in upload order
    pub fn significant_rows(&self, alpha: f64) -> Vec<DeRow> {
        (0..self.n_genes())
            .filter(|&i| self.is_significant(i, alpha))
            .map(|i| self.row(i))
            .collect()
    }

    /// Summary statistics
    pub fn summary(&self, alpha: f64) -> ResultsSummary {
        ResultsSummary {
            total_genes: self.n_genes(),
            genes_tested: self.padj.iter().filter(|p| p.is_finite()).count(),
            significant: self.significant_genes(alpha).len(),
            upregulated: self.upregulated_genes(alpha, 0.0).len(),
            downregulated: self.downregulated_genes(alpha, 0.0).len(),
            alpha,
        }
    }
}

fn required_numeric(table: &TabularDataset, name: &str) -> Result<Vec<f64>> {
    let column = table.column(name).ok_or_else(|| ExplorerError::MissingColumn {
        column: name.to_string(),
        table: "differential expression results".to_string(),
    })?;

    column
        .as_numeric()
        .map(|v| v.to_vec())
        .ok_or_else(|| ExplorerError::InvalidTable {
            reason: format!("column '{}' must be numeric", name),
        })
}

/// Summary of DE results at one significance level
#[derive(Debug, Clone, Serialize)]
pub struct ResultsSummary {
    pub total_genes: usize,
    pub genes_tested: usize,
    pub significant: usize,
    pub upregulated: usize,
    pub downregulated: usize,
    pub alpha: f64,
}

impl std::fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Differential Expression Summary")?;
        writeln!(f, "===============================")?;
        writeln!(f, "Total genes: {}", self.total_genes)?;
        writeln!(f, "Genes with padj: {}", self.genes_tested)?;
        writeln!(f, "Significant (padj < {}): {}", self.alpha, self.significant)?;
        writeln!(f, "  Up-regulated: {}", self.upregulated)?;
        writeln!(f, "  Down-regulated: {}", self.downregulated)?;
        Ok(())
    }
}
