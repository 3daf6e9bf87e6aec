//! Descriptive summaries of sample information and counts matrices

mod describe;

pub use describe::{
    describe_column, describe_counts, describe_sample_info, describe_table, ColumnSummary, CountsOverview,
};
