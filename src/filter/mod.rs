//! Filtering of counts matrices before projection and clustering

mod variance;

pub use variance::{
    filter_counts, row_stats, DiagnosticPoint, FilterCriteria, FilterSummary, FilteredCountsMatrix, RowStats,
    MAX_CRITERION,
};
