//! Similarity ranking.
//!
//! The query row is scored against every row, itself included, so positions
//! stay aligned with the catalog. Ranking is a stable descending sort: rows
//! with equal scores keep catalog order. The query row is removed after
//! sorting, by index rather than by position in the sorted list, so an exact
//! duplicate ranked above it cannot push it into the results.

use crate::cosine::cosine_with_norms;
use data_loader::{FeatureMatrix, RowIndex};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

/// Number of neighbours shown in the gallery
pub const DEFAULT_TOP_K: usize = 5;

/// One entry of a similarity ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredRow {
    pub row: RowIndex,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Similarity of `query` to every row, in row order.
///
/// Returns `None` when `query` is not a row of `matrix`. The scan runs on
/// the rayon pool; `collect` keeps row order, so the output is identical to
/// a sequential scan.
pub fn similarity_row(matrix: &FeatureMatrix, query: RowIndex) -> Option<Vec<f32>> {
    let query_vector = matrix.row(query)?;
    let query_norm = matrix.norm(query)?;

    Some(
        matrix
            .values()
            .par_chunks_exact(matrix.width())
            .zip(matrix.norms().par_iter())
            .map(|(row, &norm)| cosine_with_norms(query_vector, query_norm, row, norm))
            .collect(),
    )
}

/// Sort descending by score (stable), drop `query`, keep the first `k`.
pub fn rank_excluding(mut scored: Vec<ScoredRow>, query: RowIndex, k: usize) -> Vec<ScoredRow> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .filter(|candidate| candidate.row != query)
        .take(k)
        .collect()
}
