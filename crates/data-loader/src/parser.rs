//! Parsers for the precomputed artifacts.
//!
//! - Catalog: a JSON export of the pandas movie dictionary. Column oriented,
//!   `{"title": ..., "movie_id": ..., "vote_average": ...}`, where every
//!   column is either a list (`to_dict("list")`) or an object keyed by row
//!   position (`to_dict()`).
//! - Vectors: a text matrix, one row per line, values separated by commas
//!   and/or whitespace (the layout `numpy.savetxt` writes). A `.json` file
//!   holding an array of arrays is accepted as well.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const TITLE_COLUMN: &str = "title";
const EXTERNAL_ID_COLUMN: &str = "movie_id";
const VOTE_COLUMN: &str = "vote_average";

/// Read a whole artifact, reporting a missing file as `FileNotFound`
fn read_artifact(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Catalog
// =============================================================================

/// A single catalog column in either of the two pandas dict layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum Column<T> {
    List(Vec<T>),
    Indexed(HashMap<String, T>),
}

impl<T> Column<T> {
    /// Values in row order.
    ///
    /// Index-keyed columns must cover every position from 0 without gaps.
    fn into_rows(self, column: &str, file: &str) -> Result<Vec<T>> {
        match self {
            Column::List(values) => Ok(values),
            Column::Indexed(map) => {
                let mut keyed = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let position: usize = key.parse().map_err(|_| DataLoadError::InvalidValue {
                        field: format!("{} row key in {}", column, file),
                        value: key.clone(),
                    })?;
                    keyed.push((position, value));
                }
                keyed.sort_by_key(|(position, _)| *position);

                for (expected, (position, _)) in keyed.iter().enumerate() {
                    if *position != expected {
                        return Err(DataLoadError::ValidationError(format!(
                            "column '{}' in {} is missing row {}",
                            column, file, expected
                        )));
                    }
                }
                Ok(keyed.into_iter().map(|(_, value)| value).collect())
            }
        }
    }
}

fn take_column<T: DeserializeOwned>(
    columns: &mut HashMap<String, serde_json::Value>,
    column: &str,
    file: &str,
) -> Result<Vec<T>> {
    let raw = columns
        .remove(column)
        .ok_or_else(|| DataLoadError::MissingColumn {
            column: column.to_string(),
            file: file.to_string(),
        })?;
    let parsed: Column<T> =
        serde_json::from_value(raw).map_err(|source| DataLoadError::JsonError {
            file: format!("{} (column '{}')", file, column),
            source,
        })?;
    parsed.into_rows(column, file)
}

/// Parse the catalog JSON into records, preserving row order.
pub fn parse_catalog(path: &Path) -> Result<Vec<MovieRecord>> {
    let file = file_label(path);
    let content = read_artifact(path)?;
    parse_catalog_str(&content, &file)
}

pub(crate) fn parse_catalog_str(content: &str, file: &str) -> Result<Vec<MovieRecord>> {
    let mut columns: HashMap<String, serde_json::Value> =
        serde_json::from_str(content).map_err(|source| DataLoadError::JsonError {
            file: file.to_string(),
            source,
        })?;

    let titles: Vec<String> = take_column(&mut columns, TITLE_COLUMN, file)?;
    let external_ids: Vec<ExternalId> = take_column(&mut columns, EXTERNAL_ID_COLUMN, file)?;
    let votes: Vec<f32> = take_column(&mut columns, VOTE_COLUMN, file)?;

    if titles.len() != external_ids.len() || titles.len() != votes.len() {
        return Err(DataLoadError::ValidationError(format!(
            "columns in {} have different lengths: {}={}, {}={}, {}={}",
            file,
            TITLE_COLUMN,
            titles.len(),
            EXTERNAL_ID_COLUMN,
            external_ids.len(),
            VOTE_COLUMN,
            votes.len()
        )));
    }

    Ok(titles
        .into_iter()
        .zip(external_ids)
        .zip(votes)
        .map(|((title, external_id), average_vote)| MovieRecord {
            title,
            external_id,
            average_vote,
        })
        .collect())
}

// =============================================================================
// Feature vectors
// =============================================================================

/// Parse the feature matrix, choosing the format from the file extension.
pub fn parse_vectors(path: &Path) -> Result<FeatureMatrix> {
    let file = file_label(path);
    let content = read_artifact(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let rows: Vec<Vec<f32>> =
            serde_json::from_str(&content).map_err(|source| DataLoadError::JsonError {
                file: file.clone(),
                source,
            })?;
        FeatureMatrix::from_rows(rows)
    } else {
        parse_vectors_text(&content, &file)
    }
}

pub(crate) fn parse_vectors_text(content: &str, file: &str) -> Result<FeatureMatrix> {
    let mut rows: Vec<Vec<f32>> = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let row = line_trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f32>().map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid value '{}': {}", field, e),
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        match width {
            None => width = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(DataLoadError::FieldCountMismatch {
                    expected,
                    found: row.len(),
                    line: line_no,
                });
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    FeatureMatrix::from_rows(rows)
}
