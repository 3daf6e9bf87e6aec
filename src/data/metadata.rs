//! Sample information: per-sample metadata with typed columns

use super::table::{Column, ColumnKind, TabularDataset};
use crate::error::{ExplorerError, Result};

/// Sample metadata table
///
/// Rows are samples. The identifier used for joining against counts matrix
/// columns is either the row identifier or a designated metadata column.
#[derive(Debug, Clone)]
pub struct SampleInfo {
    table: TabularDataset,
    /// Sample identifier for every row, taken from the designated column
    sample_ids: Vec<String>,
    /// Name of the column the identifiers were taken from
    id_column: String,
}

impl SampleInfo {
    /// Wrap a parsed table, using its row identifiers as sample identifiers
    pub fn new(table: TabularDataset) -> Self {
        let sample_ids = table.row_ids().to_vec();
        let id_column = table.id_column_name().to_string();
        Self {
            table,
            sample_ids,
            id_column,
        }
    }

    /// Wrap a parsed table, taking sample identifiers from `id_column`.
    ///
    /// The row identifier column is used when `id_column` names it.
    pub fn with_id_column(table: TabularDataset, id_column: &str) -> Result<Self> {
        if id_column == table.id_column_name() {
            return Ok(Self::new(table));
        }

        // uploaded text, so numeric-looking ids such as "001" survive
        let sample_ids = table
            .column_text(id_column)
            .ok_or_else(|| ExplorerError::MissingColumn {
                column: id_column.to_string(),
                table: "sample information".to_string(),
            })?
            .to_vec();

        Ok(Self {
            sample_ids,
            id_column: id_column.to_string(),
            table,
        })
    }

    /// Underlying table
    pub fn table(&self) -> &TabularDataset {
        &self.table
    }

    /// Get sample IDs, in row order
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Name of the column holding the sample identifiers
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Get number of samples
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Names of all metadata fields
    pub fn column_names(&self) -> &[String] {
        self.table.column_names()
    }

    /// Names of categorical fields, the candidates for grouping
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.table.column_names_of_kind(ColumnKind::Categorical)
    }

    /// Names of numeric fields
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.table.column_names_of_kind(ColumnKind::Numeric)
    }

    /// Column by name, or `MissingColumn`
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.table.column(name).ok_or_else(|| ExplorerError::MissingColumn {
            column: name.to_string(),
            table: "sample information".to_string(),
        })
    }

    /// Values of a categorical column; numeric columns are rejected
    pub fn condition(&self, name: &str) -> Result<&[String]> {
        self.column(name)?
            .as_categorical()
            .ok_or_else(|| ExplorerError::InvalidInput {
                reason: format!("column '{}' is numeric, not a grouping variable", name),
            })
    }

    /// Values of a numeric column; categorical columns are rejected
    pub fn continuous(&self, name: &str) -> Result<&[f64]> {
        self.column(name)?
            .as_numeric()
            .ok_or_else(|| ExplorerError::InvalidInput {
                reason: format!("column '{}' is categorical, not numeric", name),
            })
    }

    /// Get unique levels for a categorical column (sorted)
    pub fn levels(&self, name: &str) -> Result<Vec<String>> {
        let mut unique: Vec<String> = self.condition(name)?.to_vec();
        unique.sort();
        unique.dedup();
        Ok(unique)
    }

    /// Get sample indices for a specific level of a categorical column
    pub fn samples_with_level(&self, name: &str, level: &str) -> Vec<usize> {
        self.condition(name)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.as_str() == level)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }
}
