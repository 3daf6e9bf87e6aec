//! Data structures for uploaded datasets

mod count_matrix;
mod metadata;
mod table;

pub use count_matrix::CountsMatrix;
pub use metadata::SampleInfo;
pub use table::{Column, ColumnKind, TabularDataset};
