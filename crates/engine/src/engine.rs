//! The rating and similarity engine.
//!
//! Holds the loaded artifacts and the rating model; both are immutable and
//! shared, so the engine is cheap to clone into blocking tasks.

use crate::ranking::{self, ScoredRow};
use data_loader::{DataIndex, RowIndex};
use ml_client::{ModelError, RatingModel};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors produced while evaluating one request
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Row {row} is outside the catalog ({len} movies)")]
    RowOutOfBounds { row: RowIndex, len: usize },

    #[error("Model expects {model} features but the vectors have {vectors}")]
    WidthMismatch { model: usize, vectors: usize },

    #[error("Rating model failed: {0}")]
    Model(#[from] ModelError),
}

#[derive(Clone)]
pub struct RatingEngine {
    index: Arc<DataIndex>,
    model: Arc<dyn RatingModel>,
}

impl RatingEngine {
    /// Pair the artifacts with a model.
    ///
    /// When the model knows its input width, it must equal the width of the
    /// feature vectors.
    pub fn new(index: Arc<DataIndex>, model: Arc<dyn RatingModel>) -> Result<Self, EngineError> {
        if let Some(model_width) = model.expected_width() {
            if model_width != index.feature_width() {
                return Err(EngineError::WidthMismatch {
                    model: model_width,
                    vectors: index.feature_width(),
                });
            }
        }
        Ok(Self { index, model })
    }

    pub fn index(&self) -> &Arc<DataIndex> {
        &self.index
    }

    pub fn model(&self) -> &Arc<dyn RatingModel> {
        &self.model
    }

    fn vector(&self, row: RowIndex) -> Result<&[f32], EngineError> {
        self.index.vector(row).ok_or(EngineError::RowOutOfBounds {
            row,
            len: self.index.len(),
        })
    }

    /// Predict the rating of one movie from its feature vector.
    ///
    /// Calls the model exactly once; failures are returned, not retried.
    #[instrument(skip(self), fields(model = self.model.name()))]
    pub async fn predict_rating(&self, row: RowIndex) -> Result<f32, EngineError> {
        let vector = self.vector(row)?;
        let rating = self.model.predict(vector).await?;
        debug!("Predicted rating {:.3} for row {}", rating, row);
        Ok(rating)
    }

    /// Cosine similarity of `row` to every row (itself included), in
    /// catalog order.
    pub fn similarity_row(&self, row: RowIndex) -> Result<Vec<f32>, EngineError> {
        ranking::similarity_row(self.index.vectors(), row).ok_or(EngineError::RowOutOfBounds {
            row,
            len: self.index.len(),
        })
    }

    /// The `k` rows most similar to `row`, most similar first, `row` itself
    /// excluded. Returns `min(k, len - 1)` entries.
    #[instrument(skip(self))]
    pub fn top_similar(&self, row: RowIndex, k: usize) -> Result<Vec<ScoredRow>, EngineError> {
        let scores = self.similarity_row(row)?;
        let scored = self
            .index
            .rows()
            .zip(scores)
            .map(|(candidate, score)| ScoredRow {
                row: candidate,
                score,
            })
            .collect();

        let ranked = ranking::rank_excluding(scored, row, k);
        debug!("Ranked {} neighbours for row {}", ranked.len(), row);
        Ok(ranked)
    }
}
