//! Heatmap data: leading filtered genes, row-standardized and clustered

use kodama::{linkage, Method};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

use crate::data::CountsMatrix;
use crate::stats::finite_mean_sd;

/// Options for building heatmap data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapOptions {
    /// Maximum number of leading rows
    pub max_rows: usize,
    /// Apply log10(x + 1) before standardizing
    pub log_transform: bool,
    /// Reorder rows and columns by average-linkage clustering
    pub cluster: bool,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            max_rows: 50,
            log_transform: true,
            cluster: true,
        }
    }
}

/// Row-standardized values ready for a heatmap renderer
#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    /// Row labels in display order
    pub gene_ids: Vec<String>,
    /// Column labels in display order
    pub sample_ids: Vec<String>,
    /// z-scores (rows x columns) in display order; missing cells stay `NaN`
    pub values: Vec<Vec<f64>>,
}

/// Build heatmap data from the first `max_rows` genes of `counts`.
///
/// Each row is scaled to mean 0 and standard deviation 1 over its finite
/// cells; constant rows become all zeros. Returns `None` when there is no row
/// to show.
pub fn heatmap(counts: &CountsMatrix, options: &HeatmapOptions) -> Option<Heatmap> {
    let n_rows = counts.n_genes().min(options.max_rows);
    if n_rows == 0 || counts.n_samples() == 0 {
        log::debug!("Heatmap skipped: no rows available");
        return None;
    }

    let mut values = counts
        .counts()
        .select(Axis(0), &(0..n_rows).collect::<Vec<_>>());
    if options.log_transform {
        values.mapv_inplace(|v| (v + 1.0).log10());
    }
    standardize_rows(&mut values);

    let (row_order, col_order) = if options.cluster {
        (
            average_linkage_order(values.view()),
            average_linkage_order(values.t()),
        )
    } else {
        ((0..n_rows).collect(), (0..counts.n_samples()).collect())
    };

    let gene_ids = row_order.iter().map(|&i| counts.gene_ids()[i].clone()).collect();
    let sample_ids = col_order.iter().map(|&j| counts.sample_ids()[j].clone()).collect();
    let values = row_order
        .iter()
        .map(|&i| col_order.iter().map(|&j| values[[i, j]]).collect())
        .collect();

    Some(Heatmap {
        gene_ids,
        sample_ids,
        values,
    })
}

/// Scale every row to mean 0 and unit standard deviation over its finite cells
pub fn standardize_rows(values: &mut Array2<f64>) {
    for mut row in values.rows_mut() {
        let Some((mean, sd)) = finite_mean_sd(row.iter()) else {
            continue;
        };

        row.mapv_inplace(|v| {
            if !v.is_finite() {
                f64::NAN
            } else if sd > 0.0 {
                (v - mean) / sd
            } else {
                0.0
            }
        });
    }
}

/// Euclidean distance over the coordinates finite in both rows, rescaled to
/// the full dimension. `None` when no coordinate is shared.
fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut shared = 0usize;
    for (&x, &y) in a.iter().zip(b.iter()) {
        if x.is_finite() && y.is_finite() {
            sum += (x - y).powi(2);
            shared += 1;
        }
    }
    if shared == 0 {
        None
    } else {
        Some((sum * a.len() as f64 / shared as f64).sqrt())
    }
}

/// Pairwise row distances in condensed (upper triangle, row-major) order
fn condensed_distances(data: ArrayView2<f64>) -> Vec<f64> {
    let n = data.nrows();
    let pairs: Vec<Option<f64>> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| euclidean(data.row(i), data.row(j)))
        .collect();

    // rows with nothing in common are placed as far apart as anything observed
    let max_dist = pairs.iter().flatten().copied().fold(0.0f64, f64::max);
    pairs.into_iter().map(|d| d.unwrap_or(max_dist)).collect()
}

/// Leaf order of an average-linkage (UPGMA) dendrogram over the rows of `data`.
///
/// A merged cluster lists the leaves of its first child before its second.
pub fn average_linkage_order(data: ArrayView2<f64>) -> Vec<usize> {
    let n = data.nrows();
    if n <= 2 {
        return (0..n).collect();
    }

    let mut condensed = condensed_distances(data);
    let dendrogram = linkage(&mut condensed, n, Method::Average);
    let steps = dendrogram.steps();

    // clusters below n are observations, n + k is the cluster made at step k
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + steps.len() - 1];
    while let Some(cluster) = stack.pop() {
        if cluster < n {
            order.push(cluster);
        } else {
            let step = &steps[cluster - n];
            stack.push(step.cluster2);
            stack.push(step.cluster1);
        }
    }

    log::debug!("Average-linkage order over {} rows: {:?}", n, order);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn counts(values: Array2<f64>) -> CountsMatrix {
        let (n_genes, n_samples) = values.dim();
        CountsMatrix::new(
            values,
            (0..n_genes).map(|i| format!("g{}", i)).collect(),
            (0..n_samples).map(|i| format!("s{}", i)).collect(),
        )
        .unwrap()
    }

    fn plain() -> HeatmapOptions {
        HeatmapOptions {
            max_rows: 50,
            log_transform: false,
            cluster: false,
        }
    }

    #[test]
    fn test_rows_standardized() {
        let m = counts(array![[1.0, 2.0, 3.0], [10.0, 10.0, 10.0], [5.0, f64::NAN, 9.0]]);
        let map = heatmap(&m, &plain()).unwrap();

        let first = &map.values[0];
        assert!(first.iter().sum::<f64>().abs() < 1e-12);
        assert!((first[2] - 1.0).abs() < 1e-12);
        assert_eq!(map.values[1], vec![0.0, 0.0, 0.0]);
        assert!(map.values[2][1].is_nan());
        assert!((map.values[2][0] + map.values[2][2]).abs() < 1e-12);
    }

    #[test]
    fn test_leading_rows_only() {
        let values = Array2::from_shape_fn((80, 4), |(i, j)| (i * 4 + j) as f64);
        let map = heatmap(&counts(values), &HeatmapOptions { max_rows: 50, ..plain() }).unwrap();
        assert_eq!(map.gene_ids.len(), 50);
        assert_eq!(map.gene_ids[49], "g49");

        let few = Array2::from_shape_fn((3, 4), |(i, j)| (i + j) as f64);
        assert_eq!(heatmap(&counts(few), &plain()).unwrap().values.len(), 3);
    }

    #[test]
    fn test_no_rows_renders_nothing() {
        let m = counts(Array2::zeros((0, 4)));
        assert!(heatmap(&m, &HeatmapOptions::default()).is_none());
    }

    #[test]
    fn test_log_transform() {
        let m = counts(array![[0.0, 9.0, 99.0]]);
        let opts = HeatmapOptions { log_transform: true, ..plain() };
        let map = heatmap(&m, &opts).unwrap();
        // log10 values 0, 1, 2 standardize to -1, 0, 1
        assert!((map.values[0][0] + 1.0).abs() < 1e-12);
        assert!(map.values[0][1].abs() < 1e-12);
    }

    #[test]
    fn test_average_linkage_groups_similar_rows() {
        let data = array![[0.0, 0.0], [10.0, 10.0], [0.1, 0.0], [10.0, 10.2], [0.0, 0.2]];
        let order = average_linkage_order(data.view());
        assert_eq!(order.len(), 5);
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        let low = [pos(0), pos(2), pos(4)];
        let high = [pos(1), pos(3)];
        assert!(low.iter().all(|&l| high.iter().all(|&h| l < h)) || low.iter().all(|&l| high.iter().all(|&h| l > h)));
    }

    #[test]
    fn test_linkage_order_with_disjoint_rows() {
        let nan = f64::NAN;
        let data = array![[1.0, nan, 3.0], [nan, 2.0, nan], [1.1, nan, 3.1], [5.0, 5.0, 5.0]];
        let mut order = average_linkage_order(data.view());
        let pos0 = order.iter().position(|&x| x == 0).unwrap();
        let pos2 = order.iter().position(|&x| x == 2).unwrap();
        assert_eq!((pos0 as i64 - pos2 as i64).abs(), 1);
        order.sort();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_clustered_heatmap_is_a_permutation() {
        let m = counts(array![
            [1.0, 8.0, 2.0, 9.0],
            [7.0, 1.0, 6.0, 2.0],
            [1.5, 7.5, 2.5, 8.0],
        ]);
        let map = heatmap(&m, &HeatmapOptions { cluster: true, ..plain() }).unwrap();
        let mut genes = map.gene_ids.clone();
        genes.sort();
        assert_eq!(genes, vec!["g0", "g1", "g2"]);
        assert_eq!(map.sample_ids.len(), 4);
        // g0 and g2 move together
        let p0 = map.gene_ids.iter().position(|g| g == "g0").unwrap();
        let p2 = map.gene_ids.iter().position(|g| g == "g2").unwrap();
        assert_eq!((p0 as i64 - p2 as i64).abs(), 1);
    }
}
