//! Error types for the data-loader crate.
//!
//! Every variant is fatal: a session cannot start with a catalog or feature
//! matrix that failed to load.

use thiserror::Error;

/// Errors that can occur while loading the precomputed artifacts
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Artifact file does not exist
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Catalog JSON could not be decoded
    #[error("Malformed JSON in {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Line in a text artifact couldn't be parsed
    ///
    /// Stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A matrix row has a different width than the first row
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A required catalog column is absent
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    /// Catalog and feature matrix are not row-aligned
    #[error("Catalog has {catalog} rows but feature matrix has {vectors} rows")]
    RowCountMismatch { catalog: usize, vectors: usize },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Instead of writing `Result<T, DataLoadError>` everywhere,
/// we can write `Result<T>`
pub type Result<T> = std::result::Result<T, DataLoadError>;
