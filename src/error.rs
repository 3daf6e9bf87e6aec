//! Error types for rnaseq_explorer

use thiserror::Error;

/// Main error type for dataset loading, filtering and view derivation
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Unsupported file format '{extension}': expected .csv, .txt or .tsv")]
    UnsupportedFormat { extension: String },

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("Missing required input: {what}")]
    MissingRequiredInput { what: String },

    #[error("Gene '{gene_id}' not found in counts matrix")]
    GeneNotFound { gene_id: String },

    #[error("Identifier '{id}' not found in {space}")]
    IdentifierNotFound { id: String, space: String },

    #[error("Insufficient data for {operation}: {reason}")]
    InsufficientData { operation: String, reason: String },

    #[error("Invalid table: {reason}")]
    InvalidTable { reason: String },

    #[error("Missing column '{column}' in {table}")]
    MissingColumn { column: String, table: String },

    #[error("Invalid filter criteria: {reason}")]
    InvalidCriteria { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ExplorerError {
    /// Errors the presentation layer swallows instead of showing.
    ///
    /// Only `MissingRequiredInput` qualifies: a view whose upload has not
    /// happened yet simply renders nothing.
    pub fn is_silent(&self) -> bool {
        matches!(self, ExplorerError::MissingRequiredInput { .. })
    }
}

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_input_is_silent() {
        let missing = ExplorerError::MissingRequiredInput {
            what: "counts matrix".to_string(),
        };
        assert!(missing.is_silent());

        let not_found = ExplorerError::GeneNotFound {
            gene_id: "TP53".to_string(),
        };
        assert!(!not_found.is_silent());
        assert_eq!(not_found.to_string(), "Gene 'TP53' not found in counts matrix");
    }
}
