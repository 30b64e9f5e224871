//! Loading the row-aligned artifacts into a `DataIndex`.
//!
//! Steps:
//! 1. Parse the catalog and the feature matrix in parallel (Rayon)
//! 2. Check that both describe the same number of movies
//! 3. Hand back an immutable index

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

impl DataIndex {
    /// Load the catalog and the feature matrix from a directory.
    ///
    /// This is a one-shot startup operation: any missing, corrupt or
    /// inconsistent artifact is returned as an error and must end the
    /// session.
    pub fn load_from_files(data_dir: &Path, paths: &ArtifactPaths) -> Result<Self> {
        info!("Loading artifacts from {:?}", data_dir);
        let start = Instant::now();

        let catalog_path = data_dir.join(&paths.catalog);
        let vectors_path = data_dir.join(&paths.vectors);

        // Rayon's `join` runs both parsers in parallel
        let (catalog, vectors) = rayon::join(
            || parser::parse_catalog(&catalog_path),
            || parser::parse_vectors(&vectors_path),
        );
        let catalog = catalog?;
        let vectors = vectors?;

        info!(
            "Parsed {} catalog rows and a {}x{} feature matrix",
            catalog.len(),
            vectors.len(),
            vectors.width()
        );

        let index = DataIndex::new(catalog, vectors)?;

        info!("Artifacts loaded and validated in {:.2?}", start.elapsed());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataLoadError;
    use std::fs;

    fn write_artifacts(dir: &Path, catalog: &str, vectors: &str) -> ArtifactPaths {
        let paths = ArtifactPaths::default();
        fs::write(dir.join(&paths.catalog), catalog).unwrap();
        fs::write(dir.join(&paths.vectors), vectors).unwrap();
        paths
    }

    #[test]
    fn test_load_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(
            dir.path(),
            r#"{"movie_id": [19995, 285, 206647], "title": ["Avatar", "Pirates", "Spectre"], "vote_average": [7.2, 6.9, 6.3]}"#,
            "1 0 1\n0 1 1\n1 1 0\n",
        );

        let index = DataIndex::load_from_files(dir.path(), &paths).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.feature_width(), 3);

        let row = index.find_by_title("Spectre").unwrap();
        assert_eq!(index.movie(row).unwrap().external_id, 206647);
        assert_eq!(index.vector(row).unwrap(), &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_load_fails_fast_on_row_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(
            dir.path(),
            r#"{"movie_id": [1, 2], "title": ["A", "B"], "vote_average": [5, 6]}"#,
            "1 0\n0 1\n1 1\n",
        );

        let err = DataIndex::load_from_files(dir.path(), &paths).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::RowCountMismatch {
                catalog: 2,
                vectors: 3
            }
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::default();
        fs::write(dir.path().join(&paths.vectors), "1 0\n").unwrap();

        let err = DataIndex::load_from_files(dir.path(), &paths).unwrap_err();
        match err {
            DataLoadError::FileNotFound { path } => assert!(path.ends_with("movie_dict.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_json_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths {
            catalog: "movies.json".to_string(),
            vectors: "vectors.json".to_string(),
        };
        fs::write(
            dir.path().join(&paths.catalog),
            r#"{"movie_id": [1], "title": ["Solo"], "vote_average": [8]}"#,
        )
        .unwrap();
        fs::write(dir.path().join(&paths.vectors), "[[0.25, 0.75]]").unwrap();

        let index = DataIndex::load_from_files(dir.path(), &paths).unwrap();
        assert_eq!(index.feature_width(), 2);
    }
}
