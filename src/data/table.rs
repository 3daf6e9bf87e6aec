//! Generic delimited table with typed columns

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// Kind of a column, decided once when the table is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Column values, tagged by kind
///
/// Missing numeric cells are stored as `NaN`, missing categorical cells as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    /// Infer the kind of a column from its raw cells.
    ///
    /// A column is numeric when every non-missing cell parses as `f64` and at
    /// least one cell is present.
    pub fn infer(raw: Vec<String>) -> Self {
        let mut any_value = false;
        let all_numeric = raw.iter().all(|cell| {
            if is_missing(cell) {
                return true;
            }
            any_value = true;
            cell.trim().parse::<f64>().is_ok()
        });

        if all_numeric && any_value {
            Column::Numeric(
                raw.iter()
                    .map(|cell| {
                        if is_missing(cell) {
                            f64::NAN
                        } else {
                            cell.trim().parse::<f64>().unwrap_or(f64::NAN)
                        }
                    })
                    .collect(),
            )
        } else {
            Column::Categorical(
                raw.into_iter()
                    .map(|cell| if is_missing(&cell) { String::new() } else { cell })
                    .collect(),
            )
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Categorical(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Cell rendered back to text; missing numeric cells become `NA`
    pub fn cell_text(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => {
                let x = v[row];
                if x.is_nan() {
                    "NA".to_string()
                } else {
                    x.to_string()
                }
            }
            Column::Categorical(v) => v[row].clone(),
        }
    }

}

/// Cell markers treated as missing values
fn is_missing(cell: &str) -> bool {
    matches!(cell.trim(), "" | "NA" | "na" | "NaN" | "nan")
}

/// Ordered set of named columns keyed by a row identifier column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularDataset {
    /// Header of the identifier column
    id_column_name: String,
    /// Row identifiers, as displayed
    row_ids: Vec<String>,
    /// Field names, in file order
    column_names: Vec<String>,
    /// Field values, parallel to `column_names`
    columns: Vec<Column>,
    /// Cell text as uploaded, parallel to `columns`
    text: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Build a dataset, checking that every column has one value per row.
    ///
    /// Cell text is rendered from the typed values.
    pub fn new(
        id_column_name: String,
        row_ids: Vec<String>,
        column_names: Vec<String>,
        columns: Vec<Column>,
    ) -> Result<Self> {
        let text = columns
            .iter()
            .map(|c| (0..c.len()).map(|i| c.cell_text(i)).collect())
            .collect();
        Self::with_text(id_column_name, row_ids, column_names, columns, text)
    }

    fn with_text(
        id_column_name: String,
        row_ids: Vec<String>,
        column_names: Vec<String>,
        columns: Vec<Column>,
        text: Vec<Vec<String>>,
    ) -> Result<Self> {
        if column_names.len() != columns.len() {
            return Err(ExplorerError::DimensionMismatch {
                expected: format!("{} columns", column_names.len()),
                got: format!("{} columns", columns.len()),
            });
        }

        for (name, column) in column_names.iter().zip(columns.iter()) {
            if column.len() != row_ids.len() {
                return Err(ExplorerError::InvalidTable {
                    reason: format!(
                        "column '{}' has {} values for {} rows",
                        name,
                        column.len(),
                        row_ids.len()
                    ),
                });
            }
        }

        let mut seen = HashSet::new();
        for id in &row_ids {
            if !seen.insert(id) {
                log::warn!("Duplicate row identifier '{}'; lookups use the first occurrence", id);
            }
        }

        Ok(Self {
            id_column_name,
            row_ids,
            column_names,
            columns,
            text,
        })
    }

    /// Build a dataset from raw text cells, inferring each column's kind.
    ///
    /// The raw cells are kept as the displayed text.
    pub fn from_raw(
        id_column_name: String,
        row_ids: Vec<String>,
        column_names: Vec<String>,
        raw_columns: Vec<Vec<String>>,
    ) -> Result<Self> {
        let columns = raw_columns.iter().cloned().map(Column::infer).collect();
        Self::with_text(id_column_name, row_ids, column_names, columns, raw_columns)
    }

    pub fn id_column_name(&self) -> &str {
        &self.id_column_name
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Cell text as uploaded
    pub fn cell_text(&self, column: usize, row: usize) -> &str {
        &self.text[column][row]
    }

    /// Text cells of a column by exact name, as uploaded
    pub fn column_text(&self, name: &str) -> Option<&[String]> {
        self.column_index(name).map(|i| self.text[i].as_slice())
    }

    /// Names of the columns of the given kind, in file order
    pub fn column_names_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.column_names
            .iter()
            .zip(self.columns.iter())
            .filter(|(_, c)| c.kind() == kind)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}
