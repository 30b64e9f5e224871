//! Core domain types for the precomputed movie artifacts.
//!
//! The catalog, the feature matrix and every ranking produced from them are
//! aligned by position. `RowIndex` makes that alignment explicit: it can only
//! be obtained from a loaded `DataIndex`, so an index taken from the catalog
//! always addresses the same movie in the matrix.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier used to query the poster-image service (TMDB movie id)
pub type ExternalId = u32;

/// Position of a movie in the catalog and in the feature matrix.
///
/// Serializes as the bare position; there is no `Deserialize`, since a row
/// index read from outside could address a different catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowIndex(usize);

impl RowIndex {
    pub(crate) fn new(position: usize) -> Self {
        Self(position)
    }

    /// Raw catalog position
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// One catalog entry. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub external_id: ExternalId,
    /// Reference rating from the source dataset (0-10 scale)
    pub average_vote: f32,
}

// =============================================================================
// Feature matrix
// =============================================================================

/// Dense row-major matrix of tag vectors, one row per catalog entry.
///
/// Row L2 norms are computed once, in f64, when the matrix is built.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    values: Vec<f32>,
    width: usize,
    norms: Vec<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from parsed rows.
    ///
    /// Fails on an empty matrix, a zero-width first row, ragged rows or
    /// non-finite values. Row numbers in errors are 1-based.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            Some(_) => {
                return Err(DataLoadError::ValidationError(
                    "feature vectors must have at least one column".to_string(),
                ));
            }
            None => {
                return Err(DataLoadError::ValidationError(
                    "feature matrix has no rows".to_string(),
                ));
            }
        };

        let mut values = Vec::with_capacity(rows.len() * width);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(DataLoadError::FieldCountMismatch {
                    expected: width,
                    found: row.len(),
                    line: idx + 1,
                });
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(DataLoadError::InvalidValue {
                    field: format!("vector row {}", idx + 1),
                    value: bad.to_string(),
                });
            }
            values.extend_from_slice(row);
        }

        let norms = values
            .chunks_exact(width)
            .map(|row| {
                row.iter()
                    .map(|&v| f64::from(v) * f64::from(v))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        Ok(Self {
            values,
            width,
            norms,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.norms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.norms.is_empty()
    }

    /// Number of columns shared by every row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Vector for a row, if the row exists
    pub fn row(&self, row: RowIndex) -> Option<&[f32]> {
        let start = row.get().checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        self.values.get(start..end)
    }

    /// Precomputed L2 norm for a row, accumulated in f64
    pub fn norm(&self, row: RowIndex) -> Option<f64> {
        self.norms.get(row.get()).copied()
    }

    /// All values, row-major
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Row norms in row order
    pub fn norms(&self) -> &[f64] {
        &self.norms
    }
}

// =============================================================================
// Artifact locations
// =============================================================================

/// File names of the artifacts inside the artifacts directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub catalog: String,
    pub vectors: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            catalog: "movie_dict.json".to_string(),
            vectors: "vectorized_tags.txt".to_string(),
        }
    }
}

// =============================================================================
// DataIndex - the loaded, row-aligned artifacts
// =============================================================================

/// Catalog plus feature matrix, validated to be row-aligned.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct DataIndex {
    pub(crate) catalog: Vec<MovieRecord>,
    pub(crate) vectors: FeatureMatrix,
}

impl DataIndex {
    /// Pair a catalog with its feature matrix.
    ///
    /// Fails with `RowCountMismatch` instead of truncating either side.
    pub fn new(catalog: Vec<MovieRecord>, vectors: FeatureMatrix) -> Result<Self> {
        if catalog.len() != vectors.len() {
            return Err(DataLoadError::RowCountMismatch {
                catalog: catalog.len(),
                vectors: vectors.len(),
            });
        }
        Ok(Self { catalog, vectors })
    }

    /// Number of movies
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Width of every feature vector
    pub fn feature_width(&self) -> usize {
        self.vectors.width()
    }

    /// Bounds-checked conversion from a raw position
    pub fn row_index(&self, position: usize) -> Option<RowIndex> {
        (position < self.catalog.len()).then(|| RowIndex::new(position))
    }

    /// Every row in catalog order
    pub fn rows(&self) -> impl Iterator<Item = RowIndex> + '_ {
        (0..self.catalog.len()).map(RowIndex::new)
    }

    pub fn movie(&self, row: RowIndex) -> Option<&MovieRecord> {
        self.catalog.get(row.get())
    }

    pub fn vector(&self, row: RowIndex) -> Option<&[f32]> {
        self.vectors.row(row)
    }

    pub fn vectors(&self) -> &FeatureMatrix {
        &self.vectors
    }

    /// Titles in catalog order (the options of the selection control)
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.catalog.iter().map(|m| m.title.as_str())
    }

    /// First row whose title matches exactly
    pub fn find_by_title(&self, title: &str) -> Option<RowIndex> {
        self.catalog
            .iter()
            .position(|m| m.title == title)
            .map(RowIndex::new)
    }

    /// Case-insensitive substring search.
    ///
    /// Exact (case-insensitive) matches come first, then substring matches;
    /// catalog order is kept within each group.
    pub fn search_titles(&self, query: &str) -> Vec<(RowIndex, &MovieRecord)> {
        let query = query.to_lowercase();
        let mut matches: Vec<(u8, RowIndex, &MovieRecord)> = self
            .catalog
            .iter()
            .enumerate()
            .filter_map(|(idx, movie)| {
                let title = movie.title.to_lowercase();
                if title == query {
                    Some((0, RowIndex::new(idx), movie))
                } else if title.contains(&query) {
                    Some((1, RowIndex::new(idx), movie))
                } else {
                    None
                }
            })
            .collect();
        matches.sort_by_key(|(rank, row, _)| (*rank, *row));
        matches
            .into_iter()
            .map(|(_, row, movie)| (row, movie))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, external_id: ExternalId) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            external_id,
            average_vote: 7.0,
        }
    }

    #[test]
    fn test_row_index_serializes_as_position() {
        let index = DataIndex::new(
            vec![record("Avatar", 19995), record("Spectre", 206647)],
            FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap(),
        )
        .unwrap();
        let rows: Vec<RowIndex> = index.rows().collect();
        assert_eq!(serde_json::to_string(&rows).unwrap(), "[0,1]");
    }

    #[test]
    fn test_matrix_norms_accumulate_in_f64() {
        // 16_777_217 is not representable in f32, so an f32 sum of squares
        // would lose the trailing 1
        let matrix = FeatureMatrix::from_rows(vec![vec![4096.0, 1.0]]).unwrap();
        assert_eq!(matrix.norm(RowIndex::new(0)), Some(16_777_217f64.sqrt()));
    }

    #[test]
    fn test_matrix_norms() {
        let matrix = FeatureMatrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(matrix.width(), 2);
        assert_eq!(matrix.norm(RowIndex::new(0)), Some(5.0));
        assert_eq!(matrix.norm(RowIndex::new(1)), Some(0.0));
        assert_eq!(matrix.row(RowIndex::new(1)), Some(&[0.0, 0.0][..]));
        assert!(matrix.row(RowIndex::new(2)).is_none());
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let err = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch {
                expected: 2,
                found: 1,
                line: 2
            }
        ));
    }

    #[test]
    fn test_matrix_rejects_empty_and_nan() {
        assert!(FeatureMatrix::from_rows(vec![]).is_err());
        assert!(FeatureMatrix::from_rows(vec![vec![]]).is_err());
        let err = FeatureMatrix::from_rows(vec![vec![f32::NAN]]).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_row_count_mismatch_is_fatal() {
        let matrix = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        let err = DataIndex::new(vec![record("Avatar", 19995)], matrix).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::RowCountMismatch {
                catalog: 1,
                vectors: 2
            }
        ));
        assert!(err.to_string().contains("1 rows"));
    }

    #[test]
    fn test_find_by_title_returns_first_match() {
        let matrix = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let index = DataIndex::new(
            vec![record("Heat", 949), record("Alien", 348), record("Heat", 11)],
            matrix,
        )
        .unwrap();

        let row = index.find_by_title("Heat").unwrap();
        assert_eq!(row.get(), 0);
        assert_eq!(index.movie(row).unwrap().external_id, 949);
        assert!(index.find_by_title("heat").is_none());
    }

    #[test]
    fn test_search_titles_orders_exact_first() {
        let matrix = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let index = DataIndex::new(
            vec![
                record("Alien Resurrection", 8078),
                record("Aliens", 679),
                record("Alien", 348),
            ],
            matrix,
        )
        .unwrap();

        let results = index.search_titles("ALIEN");
        let titles: Vec<_> = results.iter().map(|(_, m)| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Alien Resurrection", "Aliens"]);
    }

    #[test]
    fn test_row_index_bounds() {
        let matrix = FeatureMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let index = DataIndex::new(vec![record("Up", 14160)], matrix).unwrap();
        assert!(index.row_index(0).is_some());
        assert!(index.row_index(1).is_none());
        assert_eq!(index.rows().count(), 1);
    }
}
