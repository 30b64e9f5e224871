//! # Data Loader Crate
//!
//! Loads the precomputed artifacts behind the rating demo: the movie catalog
//! and the tag-vector feature matrix.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RowIndex, MovieRecord, FeatureMatrix, DataIndex)
//! - **parser**: Parse the catalog JSON and the vector matrix
//! - **index**: Load and validate both artifacts
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ArtifactPaths, DataIndex};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("artifacts"), &ArtifactPaths::default())?;
//!
//! let row = index.find_by_title("Avatar").unwrap();
//! let movie = index.movie(row).unwrap();
//! let vector = index.vector(row).unwrap();
//! println!("{} has {} tag features", movie.title, vector.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    ArtifactPaths,
    DataIndex,
    ExternalId,
    FeatureMatrix,
    MovieRecord,
    RowIndex,
};
