//! Descriptive summaries of uploaded tables

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{Column, CountsMatrix, SampleInfo, TabularDataset};
use crate::stats::Descriptive;

/// Summary of one metadata column, by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        name: String,
        /// `None` when every cell is missing
        stats: Option<Descriptive>,
        missing: usize,
    },
    Categorical {
        name: String,
        /// Level and number of rows, sorted by level
        levels: Vec<(String, usize)>,
        missing: usize,
    },
}

impl ColumnSummary {
    pub fn name(&self) -> &str {
        match self {
            ColumnSummary::Numeric { name, .. } | ColumnSummary::Categorical { name, .. } => name,
        }
    }
}

/// Summarize a single column
pub fn describe_column(name: &str, column: &Column) -> ColumnSummary {
    match column {
        Column::Numeric(values) => ColumnSummary::Numeric {
            name: name.to_string(),
            stats: Descriptive::from_values(values),
            missing: values.iter().filter(|v| !v.is_finite()).count(),
        },
        Column::Categorical(values) => {
            let mut levels: BTreeMap<&str, usize> = BTreeMap::new();
            let mut missing = 0;
            for v in values {
                if v.is_empty() {
                    missing += 1;
                } else {
                    *levels.entry(v.as_str()).or_insert(0) += 1;
                }
            }
            ColumnSummary::Categorical {
                name: name.to_string(),
                levels: levels.into_iter().map(|(l, n)| (l.to_string(), n)).collect(),
                missing,
            }
        }
    }
}

/// Summarize every column of a table, in file order
pub fn describe_table(table: &TabularDataset) -> Vec<ColumnSummary> {
    table
        .column_names()
        .iter()
        .zip(table.columns())
        .map(|(name, column)| describe_column(name, column))
        .collect()
}

/// Summarize every metadata column of the sample information
pub fn describe_sample_info(info: &SampleInfo) -> Vec<ColumnSummary> {
    describe_table(info.table())
}

/// Shape of a counts matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountsOverview {
    pub n_genes: usize,
    pub n_samples: usize,
    /// Cells that are missing
    pub missing_cells: usize,
    /// Cells that are exactly zero
    pub zero_cells: usize,
}

/// Overview of a counts matrix
pub fn describe_counts(counts: &CountsMatrix) -> CountsOverview {
    let values = counts.counts();
    CountsOverview {
        n_genes: counts.n_genes(),
        n_samples: counts.n_samples(),
        missing_cells: values.iter().filter(|v| v.is_nan()).count(),
        zero_cells: values.iter().filter(|&&v| v == 0.0).count(),
    }
}

impl std::fmt::Display for CountsOverview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Counts Matrix")?;
        writeln!(f, "  Genes:         {}", self.n_genes)?;
        writeln!(f, "  Samples:       {}", self.n_samples)?;
        writeln!(f, "  Zero cells:    {}", self.zero_cells)?;
        writeln!(f, "  Missing cells: {}", self.missing_cells)?;
        Ok(())
    }
}

impl std::fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSummary::Numeric { name, stats: Some(s), .. } => {
                write!(f, "{} (numeric): mean {:.3} (+/- {:.3}), range [{}, {}]", name, s.mean, s.sd, s.min, s.max)
            }
            ColumnSummary::Numeric { name, stats: None, .. } => write!(f, "{} (numeric): no values", name),
            ColumnSummary::Categorical { name, levels, .. } => {
                let joined: Vec<String> = levels.iter().map(|(l, n)| format!("{} ({})", l, n)).collect();
                write!(f, "{} (categorical): {}", name, joined.join(", "))
            }
        }
    }
}
