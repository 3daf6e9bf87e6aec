//! Reading and writing delimited tables (.csv, .txt, .tsv)

use std::path::Path;

use crate::data::TabularDataset;
use crate::error::{ExplorerError, Result};

/// Accepted upload formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated (`.csv`)
    Csv,
    /// Tab-separated (`.txt`, `.tsv`)
    Tsv,
}

impl FileFormat {
    /// Decide the format from a path's extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "txt" | "tsv" => Ok(FileFormat::Tsv),
            _ => Err(ExplorerError::UnsupportedFormat { extension }),
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Fail with `UploadTooLarge` when the file exceeds `limit` bytes
pub fn check_upload_size<P: AsRef<Path>>(path: P, limit: u64) -> Result<()> {
    let size = std::fs::metadata(path)?.len();
    if size > limit {
        return Err(ExplorerError::UploadTooLarge { size, limit });
    }
    Ok(())
}

/// Read a delimited table
/// Expected format: first row is the header, first column is the row identifier,
/// remaining columns are fields. Column kinds are inferred here, once.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<TabularDataset> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.records();

    let header = records.next().ok_or_else(|| ExplorerError::EmptyData {
        reason: format!("{} is empty", path.display()),
    })??;

    if header.is_empty() {
        return Err(ExplorerError::InvalidTable {
            reason: "Header has no identifier column".to_string(),
        });
    }

    let id_column_name = header[0].to_string();
    let column_names: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();
    let n_fields = column_names.len();

    let mut row_ids: Vec<String> = Vec::new();
    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); n_fields];

    for (line, record) in records.enumerate() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if record.len() != n_fields + 1 {
            return Err(ExplorerError::InvalidTable {
                reason: format!(
                    "Row {} has {} columns, expected {}",
                    line + 2,
                    record.len(),
                    n_fields + 1
                ),
            });
        }

        row_ids.push(record[0].to_string());
        for (column, value) in raw_columns.iter_mut().zip(record.iter().skip(1)) {
            column.push(value.to_string());
        }
    }

    if row_ids.is_empty() {
        return Err(ExplorerError::EmptyData {
            reason: format!("No data rows in {}", path.display()),
        });
    }

    log::info!(
        "Read {} rows x {} columns from {}",
        row_ids.len(),
        n_fields,
        path.display()
    );

    TabularDataset::from_raw(id_column_name, row_ids, column_names, raw_columns)
}

/// Write a table with the delimiter implied by the path's extension
pub fn write_table<P: AsRef<Path>>(table: &TabularDataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_path(path)?;

    let header = std::iter::once(table.id_column_name()).chain(table.column_names().iter().map(|s| s.as_str()));
    writer.write_record(header)?;

    for (i, row_id) in table.row_ids().iter().enumerate() {
        let record = std::iter::once(row_id.as_str()).chain((0..table.n_columns()).map(|j| table.cell_text(j, i)));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}
