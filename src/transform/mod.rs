//! Projections of a filtered counts matrix for visualization
//!
//! - PCA of the samples (scores, variance explained)
//! - Heatmap data (leading genes, row z-scores, clustering order)

mod heatmap;
mod pca;

pub use heatmap::{average_linkage_order, heatmap, standardize_rows, Heatmap, HeatmapOptions};
pub use pca::{pca, PcaPoint, PcaResult};
