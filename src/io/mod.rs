//! Input/Output operations for uploaded tables

mod delimited;
mod results;

pub use delimited::{check_upload_size, read_table, write_table, FileFormat};
pub use results::{DeResults, DeRow, ResultsSummary, LOG2_FOLD_CHANGE, PADJ, PVALUE};
