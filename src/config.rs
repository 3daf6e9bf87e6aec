//! Session configuration

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::filter::FilterCriteria;

/// 50 MiB upload ceiling
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Settings shared by all views of a session
///
/// Missing fields in a JSON config fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,
    /// Number of leading filtered genes shown in the heatmap
    pub heatmap_rows: usize,
    /// Apply log10(x + 1) before row standardization in the heatmap
    pub heatmap_log_transform: bool,
    /// Cluster heatmap rows and columns (average linkage)
    pub heatmap_cluster: bool,
    /// Significance cutoff on padj for the DE views
    pub padj_threshold: f64,
    /// Number of bins for metadata histograms
    pub histogram_bins: usize,
    /// Metadata column holding sample identifiers; `None` uses the row identifier.
    /// Matched against counts matrix column names, never against gene identifiers.
    pub sample_id_column: Option<String>,
    /// Scale genes to unit variance before PCA
    pub pca_scale: bool,
    /// Criteria applied right after a counts upload
    pub default_criteria: FilterCriteria,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            heatmap_rows: 50,
            heatmap_log_transform: true,
            heatmap_cluster: true,
            padj_threshold: 0.05,
            histogram_bins: 20,
            sample_id_column: None,
            pca_scale: false,
            default_criteria: FilterCriteria::default(),
        }
    }
}

impl ExplorerConfig {
    /// Load a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.heatmap_rows == 0 {
            return Err(ExplorerError::InvalidInput {
                reason: "heatmap_rows must be at least 1".to_string(),
            });
        }
        if self.histogram_bins == 0 {
            return Err(ExplorerError::InvalidInput {
                reason: "histogram_bins must be at least 1".to_string(),
            });
        }
        if !(self.padj_threshold > 0.0 && self.padj_threshold <= 1.0) {
            return Err(ExplorerError::InvalidInput {
                reason: format!("padj_threshold must be in (0, 1], got {}", self.padj_threshold),
            });
        }
        self.default_criteria.validate()
    }
}
