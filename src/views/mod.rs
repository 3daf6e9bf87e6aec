//! Renderer-agnostic view data
//!
//! Pure functions from the data model to point lists, bins, boxplot
//! statistics and table rows. Rendering is left to the caller.

mod expression;
mod histogram;
mod table;
mod volcano;

pub use expression::{
    boxplot_stats, gene_expression, BoxplotStats, ExpressionPoint, GeneExpressionView, MISSING_GROUP,
};
pub use histogram::{histogram, HistogramBin};
pub use table::{table_view, TableView};
pub use volcano::{de_table_rows, volcano_points, VolcanoPoint};
