//! Display rows of an uploaded table

use serde::Serialize;

use crate::data::TabularDataset;

/// Header and cell text of a table, ready for a grid widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// Identifier column name followed by the data column names
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Every cell of `table` as uploaded
pub fn table_view(table: &TabularDataset) -> TableView {
    let mut header = Vec::with_capacity(table.n_columns() + 1);
    header.push(table.id_column_name().to_string());
    header.extend(table.column_names().iter().cloned());

    let rows = table
        .row_ids()
        .iter()
        .enumerate()
        .map(|(i, id)| {
            std::iter::once(id.clone())
                .chain((0..table.n_columns()).map(|j| table.cell_text(j, i).to_string()))
                .collect()
        })
        .collect();

    TableView { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_view() {
        let table = TabularDataset::from_raw(
            "sample".to_string(),
            vec!["s1".to_string(), "s2".to_string()],
            vec!["age".to_string(), "group".to_string()],
            vec![
                vec!["31".to_string(), "".to_string()],
                vec!["ctl".to_string(), "trt".to_string()],
            ],
        )
        .unwrap();
        let view = table_view(&table);
        assert_eq!(view.header, vec!["sample", "age", "group"]);
        assert_eq!(view.rows[0], vec!["s1", "31", "ctl"]);
        assert_eq!(view.rows[1], vec!["s2", "", "trt"]);
    }
}
