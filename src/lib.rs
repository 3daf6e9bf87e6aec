//! rnaseq_explorer: data core of an interactive RNA-Seq dashboard
//!
//! Loads sample information, counts matrices and differential-expression
//! results from delimited text, filters genes by variance and non-zero count,
//! and derives renderer-agnostic view data (PCA scores, heatmap z-scores,
//! boxplot statistics, histogram bins, volcano points, table rows).
//!
//! # Example
//!
//! ```ignore
//! use rnaseq_explorer::prelude::*;
//!
//! let mut session = Session::new(ExplorerConfig::default());
//! session.upload_counts("counts.csv")?;
//! session.upload_sample_info("samples.csv")?;
//!
//! // Keep the top half of genes by variance, non-zero in at least 3 samples
//! session.apply_filters(FilterCriteria::new(50.0, 3)?)?;
//! let pca = session.pca_view()?;
//! let heatmap = session.heatmap_view()?;
//!
//! session.select_gene("ACTB")?;
//! session.select_group_column("condition")?;
//! let expression = session.expression_view()?;
//! ```

pub mod cleaning;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod io;
pub mod session;
pub mod stats;
pub mod summary;
pub mod transform;
pub mod views;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cleaning::{normalize_identifier, CleanedIndex};
    pub use crate::config::ExplorerConfig;
    pub use crate::data::{Column, ColumnKind, CountsMatrix, SampleInfo, TabularDataset};
    pub use crate::error::{ExplorerError, Result};
    pub use crate::filter::{filter_counts, FilterCriteria, FilterSummary, FilteredCountsMatrix};
    pub use crate::io::{read_table, write_table, DeResults, FileFormat};
    pub use crate::session::Session;
    pub use crate::summary::{describe_counts, describe_sample_info, ColumnSummary};
    pub use crate::transform::{heatmap, pca, Heatmap, HeatmapOptions, PcaResult};
    pub use crate::views::{gene_expression, histogram, volcano_points, GeneExpressionView, VolcanoPoint};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use ndarray::array;

    #[test]
    fn test_full_pipeline() {
        let counts = CountsMatrix::new(
            array![
                [100.0, 110.0, 90.0, 400.0, 420.0, 380.0],  // Up
                [500.0, 520.0, 480.0, 500.0, 510.0, 490.0], // Flat
                [300.0, 310.0, 290.0, 75.0, 80.0, 70.0],    // Down
                [0.0, 0.0, 0.0, 0.0, 12.0, 0.0],            // Mostly zero
                [200.0, 220.0, 180.0, 200.0, 210.0, 190.0], // Flat
                [150.0, 160.0, 140.0, 300.0, 320.0, 280.0], // Up
            ],
            vec![
                "gene_up".to_string(),
                "gene_nc1".to_string(),
                "gene_down".to_string(),
                "gene_sparse".to_string(),
                "gene_nc2".to_string(),
                "gene_up2".to_string(),
            ],
            (1..=6).map(|i| format!("s{}", i)).collect(),
        )
        .unwrap();

        let criteria = FilterCriteria::new(50.0, 3).unwrap();
        let filtered = filter_counts(&counts, &criteria).unwrap();

        // sparse gene fails the non-zero threshold, flat genes fall below the median variance
        assert!(!filtered.matrix().gene_ids().contains(&"gene_sparse".to_string()));
        assert!(filtered.matrix().gene_ids().contains(&"gene_up".to_string()));
        assert!(filtered.matrix().gene_ids().contains(&"gene_down".to_string()));
        assert!(!filtered.matrix().gene_ids().contains(&"gene_nc2".to_string()));

        let result = pca(filtered.matrix(), false).unwrap();
        let points = result.first_two().unwrap();
        assert_eq!(points.len(), 6);
        // PC1 separates the two groups of three samples
        let first: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert!(first[..3].iter().all(|&x| x.signum() == first[0].signum()));
        assert!(first[3..].iter().all(|&x| x.signum() != first[0].signum()));

        let map = heatmap(filtered.matrix(), &HeatmapOptions::default()).unwrap();
        assert_eq!(map.gene_ids.len(), filtered.n_kept());

        println!("{}", filtered.summary());
    }
}
