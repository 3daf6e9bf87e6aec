//! Per-session state: uploads, filter cache and selections
//!
//! A `Session` owns at most one dataset of each kind. Uploading replaces the
//! previous dataset of that kind and recomputes or drops what was derived from
//! it. Every operation either completes or leaves the session as it was.

use std::path::Path;

use crate::cleaning::clean_gene_ids;
use crate::config::ExplorerConfig;
use crate::data::{CountsMatrix, SampleInfo, TabularDataset};
use crate::error::{ExplorerError, Result};
use crate::filter::{filter_counts, DiagnosticPoint, FilterCriteria, FilterSummary, FilteredCountsMatrix};
use crate::io::{check_upload_size, read_table, DeResults, DeRow, FileFormat, ResultsSummary};
use crate::summary::{describe_counts, describe_sample_info, ColumnSummary, CountsOverview};
use crate::transform::{heatmap, pca, Heatmap, HeatmapOptions, PcaPoint, PcaResult};
use crate::views::{
    de_table_rows, gene_expression, histogram, table_view, volcano_points, GeneExpressionView, HistogramBin,
    TableView, VolcanoPoint,
};

fn missing(what: &str) -> ExplorerError {
    ExplorerError::MissingRequiredInput { what: what.to_string() }
}

/// Explorer session
#[derive(Debug, Clone)]
pub struct Session {
    config: ExplorerConfig,
    counts: Option<CountsMatrix>,
    sample_info: Option<SampleInfo>,
    de_results: Option<DeResults>,
    /// Criteria applied to the current counts matrix
    criteria: FilterCriteria,
    /// Filtered counts; present whenever `counts` is
    filtered: Option<FilteredCountsMatrix>,
    /// Selected gene as displayed in the counts matrix
    selected_gene: Option<String>,
    group_column: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ExplorerConfig::default())
    }
}

impl Session {
    pub fn new(config: ExplorerConfig) -> Self {
        let criteria = config.default_criteria;
        Self {
            config,
            counts: None,
            sample_info: None,
            de_results: None,
            criteria,
            filtered: None,
            selected_gene: None,
            group_column: None,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Check format and size, then parse an uploaded file
    fn read_upload(&self, path: &Path) -> Result<TabularDataset> {
        FileFormat::from_path(path)?;
        check_upload_size(path, self.config.max_upload_bytes)?;
        read_table(path)
    }

    // ---- Uploads ----

    /// Load a counts matrix and filter it with the current criteria
    pub fn upload_counts<P: AsRef<Path>>(&mut self, path: P) -> Result<&FilteredCountsMatrix> {
        let table = self.read_upload(path.as_ref())?;
        let counts = CountsMatrix::from_table(&table)?;
        self.set_counts(counts)
    }

    /// Replace the counts matrix; the filter cache is rebuilt and a selected
    /// gene that no longer exists is cleared.
    pub fn set_counts(&mut self, counts: CountsMatrix) -> Result<&FilteredCountsMatrix> {
        let filtered = filter_counts(&counts, &self.criteria)?;
        log::info!(
            "Counts matrix loaded: {} genes x {} samples",
            counts.n_genes(),
            counts.n_samples()
        );

        if let Some(gene) = &self.selected_gene {
            if !clean_gene_ids(&counts).contains(gene) {
                log::debug!("Selected gene '{}' not in new counts matrix; clearing", gene);
                self.selected_gene = None;
            }
        }
        self.counts = Some(counts);
        Ok(self.filtered.insert(filtered))
    }

    /// Load sample information, keyed by the configured identifier column
    pub fn upload_sample_info<P: AsRef<Path>>(&mut self, path: P) -> Result<&SampleInfo> {
        let table = self.read_upload(path.as_ref())?;
        let info = match &self.config.sample_id_column {
            Some(column) => SampleInfo::with_id_column(table, column)?,
            None => SampleInfo::new(table),
        };
        Ok(self.set_sample_info(info))
    }

    /// Replace the sample information; a group column it lacks is cleared
    pub fn set_sample_info(&mut self, info: SampleInfo) -> &SampleInfo {
        log::info!(
            "Sample information loaded: {} samples, {} columns",
            info.n_samples(),
            info.column_names().len()
        );
        if let Some(column) = &self.group_column {
            if info.condition(column).is_err() {
                self.group_column = None;
            }
        }
        self.sample_info.insert(info)
    }

    /// Load a differential-expression results table
    pub fn upload_de_results<P: AsRef<Path>>(&mut self, path: P) -> Result<&DeResults> {
        let table = self.read_upload(path.as_ref())?;
        let results = DeResults::from_table(table)?;
        Ok(self.set_de_results(results))
    }

    pub fn set_de_results(&mut self, results: DeResults) -> &DeResults {
        log::info!("DE results loaded: {} genes", results.n_genes());
        self.de_results.insert(results)
    }

    pub fn counts(&self) -> Result<&CountsMatrix> {
        self.counts.as_ref().ok_or_else(|| missing("counts matrix"))
    }

    pub fn sample_info(&self) -> Result<&SampleInfo> {
        self.sample_info.as_ref().ok_or_else(|| missing("sample information"))
    }

    pub fn de_results(&self) -> Result<&DeResults> {
        self.de_results.as_ref().ok_or_else(|| missing("DE results"))
    }

    // ---- Controls ----

    /// Re-filter the counts matrix with new criteria.
    ///
    /// Invalid criteria leave the previous criteria and cache in place.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) -> Result<&FilteredCountsMatrix> {
        criteria.validate()?;
        let counts = self.counts.as_ref().ok_or_else(|| missing("counts matrix"))?;
        let filtered = filter_counts(counts, &criteria)?;
        self.criteria = criteria;
        Ok(self.filtered.insert(filtered))
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Gene identifiers offered by the gene selector
    pub fn gene_choices(&self) -> Vec<&str> {
        self.counts
            .as_ref()
            .map(|c| c.gene_ids().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Categorical sample information columns offered as grouping variables,
    /// excluding the sample identifier column
    pub fn group_choices(&self) -> Vec<&str> {
        self.sample_info
            .as_ref()
            .map(|info| {
                info.categorical_columns()
                    .into_iter()
                    .filter(|&c| c != info.id_column())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Select a gene by identifier, compared in normalized form.
    ///
    /// An unknown gene fails with `GeneNotFound` and keeps the prior selection.
    pub fn select_gene(&mut self, gene: &str) -> Result<&str> {
        let counts = self.counts()?;
        let idx = clean_gene_ids(counts)
            .position(gene)
            .ok_or_else(|| ExplorerError::GeneNotFound {
                gene_id: gene.to_string(),
            })?;
        let displayed = counts.gene_ids()[idx].clone();
        Ok(self.selected_gene.insert(displayed).as_str())
    }

    pub fn selected_gene(&self) -> Option<&str> {
        self.selected_gene.as_deref()
    }

    /// Select the categorical sample information column used for grouping
    pub fn select_group_column(&mut self, column: &str) -> Result<()> {
        self.sample_info()?.condition(column)?;
        self.group_column = Some(column.to_string());
        Ok(())
    }

    /// Selected grouping column, or the first categorical column
    pub fn group_column(&self) -> Option<&str> {
        self.group_column
            .as_deref()
            .or_else(|| self.group_choices().into_iter().next())
    }

    // ---- Views ----

    /// Filtered counts for the current criteria
    pub fn filtered(&self) -> Result<&FilteredCountsMatrix> {
        self.filtered.as_ref().ok_or_else(|| missing("counts matrix"))
    }

    pub fn filter_summary(&self) -> Result<FilterSummary> {
        Ok(self.filtered()?.summary())
    }

    pub fn diagnostic_points(&self) -> Result<Vec<DiagnosticPoint>> {
        Ok(self.filtered()?.diagnostic_points())
    }

    pub fn counts_overview(&self) -> Result<CountsOverview> {
        Ok(describe_counts(self.counts()?))
    }

    pub fn sample_info_summary(&self) -> Result<Vec<ColumnSummary>> {
        Ok(describe_sample_info(self.sample_info()?))
    }

    pub fn sample_info_table(&self) -> Result<TableView> {
        Ok(table_view(self.sample_info()?.table()))
    }

    /// Histogram of a numeric sample information column
    pub fn histogram_view(&self, column: &str) -> Result<Vec<HistogramBin>> {
        let values = self.sample_info()?.continuous(column)?;
        Ok(histogram(values, self.config.histogram_bins))
    }

    /// PCA of the filtered counts
    pub fn pca_view(&self) -> Result<PcaResult> {
        pca(self.filtered()?.matrix(), self.config.pca_scale)
    }

    /// Sample coordinates on components `pc_x` and `pc_y` (1-based)
    pub fn pca_projection(&self, pc_x: usize, pc_y: usize) -> Result<Vec<PcaPoint>> {
        self.pca_view()?.projection(pc_x, pc_y)
    }

    /// Heatmap of the leading filtered genes; `None` when no gene passed
    pub fn heatmap_view(&self) -> Result<Option<Heatmap>> {
        let options = HeatmapOptions {
            max_rows: self.config.heatmap_rows,
            log_transform: self.config.heatmap_log_transform,
            cluster: self.config.heatmap_cluster,
        };
        Ok(heatmap(self.filtered()?.matrix(), &options))
    }

    /// Expression of the selected gene grouped by the selected column
    pub fn expression_view(&self) -> Result<GeneExpressionView> {
        let counts = self.counts()?;
        let info = self.sample_info()?;
        let gene = self.selected_gene().ok_or_else(|| missing("selected gene"))?;
        let column = self.group_column().ok_or_else(|| missing("grouping column"))?;
        gene_expression(counts, info, gene, column)
    }

    pub fn volcano(&self) -> Result<Vec<VolcanoPoint>> {
        Ok(volcano_points(self.de_results()?, self.config.padj_threshold))
    }

    /// DE table rows, optionally only those with padj below the threshold
    pub fn de_table(&self, significant_only: bool) -> Result<Vec<DeRow>> {
        Ok(de_table_rows(
            self.de_results()?,
            self.config.padj_threshold,
            significant_only,
        ))
    }

    pub fn de_summary(&self) -> Result<ResultsSummary> {
        Ok(self.de_results()?.summary(self.config.padj_threshold))
    }
}
