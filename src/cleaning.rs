//! Identifier normalization for joins between independently authored files
//!
//! Displayed identifiers are never rewritten; cleaning builds a lookup index
//! from the normalized form (trimmed, lowercased) to the row position.

use std::collections::HashMap;

use crate::data::{CountsMatrix, SampleInfo};

/// Canonical comparable form of an identifier
pub fn normalize_identifier(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Lookup from normalized identifier to position
#[derive(Debug, Clone, Default)]
pub struct CleanedIndex {
    positions: HashMap<String, usize>,
    /// Normalized identifiers in original order
    cleaned: Vec<String>,
}

impl CleanedIndex {
    /// Index identifiers by their normalized form.
    ///
    /// When two identifiers collide after normalization the first one wins.
    pub fn build<S: AsRef<str>>(ids: &[S]) -> Self {
        let mut positions = HashMap::with_capacity(ids.len());
        let mut cleaned = Vec::with_capacity(ids.len());

        for (i, id) in ids.iter().enumerate() {
            let key = normalize_identifier(id.as_ref());
            if positions.contains_key(&key) {
                log::warn!(
                    "Identifier '{}' collides with an earlier one after normalization",
                    id.as_ref()
                );
            } else {
                positions.insert(key.clone(), i);
            }
            cleaned.push(key);
        }

        Self { positions, cleaned }
    }

    /// Position of `id`, compared in normalized form
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(&normalize_identifier(id)).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Normalized identifiers in original order
    pub fn cleaned_ids(&self) -> &[String] {
        &self.cleaned
    }

    pub fn len(&self) -> usize {
        self.cleaned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cleaned.is_empty()
    }
}

/// Index the gene rows of a counts matrix
pub fn clean_gene_ids(counts: &CountsMatrix) -> CleanedIndex {
    let index = CleanedIndex::build(counts.gene_ids());
    log::debug!("Cleaned gene identifiers: {:?}", index.cleaned_ids());
    index
}

/// Index the sample columns of a counts matrix
pub fn clean_sample_columns(counts: &CountsMatrix) -> CleanedIndex {
    let index = CleanedIndex::build(counts.sample_ids());
    log::debug!("Cleaned counts sample columns: {:?}", index.cleaned_ids());
    index
}

/// Index the designated identifier column of the sample information
pub fn clean_sample_ids(info: &SampleInfo) -> CleanedIndex {
    let index = CleanedIndex::build(info.sample_ids());
    log::debug!(
        "Cleaned sample identifiers from '{}': {:?}",
        info.id_column(),
        index.cleaned_ids()
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  ENSG0001 \t"), "ensg0001");
        assert_eq!(normalize_identifier("Gapdh"), "gapdh");
    }

    #[test]
    fn test_index_is_case_and_space_insensitive() {
        let index = CleanedIndex::build(&["ACTB", " Gapdh ", "tp53"]);
        assert_eq!(index.position("actb"), Some(0));
        assert_eq!(index.position("GAPDH"), Some(1));
        assert_eq!(index.position(" TP53"), Some(2));
        assert!(!index.contains("myc"));
        assert_eq!(index.cleaned_ids(), &["actb", "gapdh", "tp53"]);
    }

    #[test]
    fn test_collision_keeps_first() {
        let index = CleanedIndex::build(&["Myc", "MYC "]);
        assert_eq!(index.position("myc"), Some(0));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_clean_counts_leaves_display_ids() {
        let counts = CountsMatrix::new(
            array![[1.0, 2.0]],
            vec![" Actb".to_string()],
            vec!["S1 ".to_string(), "s2".to_string()],
        )
        .unwrap();
        assert_eq!(clean_gene_ids(&counts).position("ACTB"), Some(0));
        assert_eq!(clean_sample_columns(&counts).position("s1"), Some(0));
        assert_eq!(counts.gene_ids()[0], " Actb");
    }
}
