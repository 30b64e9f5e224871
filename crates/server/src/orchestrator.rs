//! # Rating Orchestrator
//!
//! Runs one evaluation request end to end:
//! 1. Resolve the selected title to a catalog row
//! 2. Predict its rating with the model
//! 3. Rank the most similar movies (CPU-bound, on a blocking thread)
//! 4. Resolve the selected poster and the neighbour posters concurrently
//!
//! Steps 1-3 either all succeed or the request fails with no partial result.
//! Step 4 never fails: each poster falls back to the placeholder on its own.
//!
//! ## Example Usage
//!
//! ```ignore
//! let orchestrator = RatingOrchestrator::new(context);
//! let evaluation = orchestrator.evaluate("Avatar").await?;
//! println!("{}", evaluation.predicted_rating_label());
//! ```

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::context::AppContext;
use data_loader::{DataIndex, ExternalId, RowIndex};
use engine::{EngineError, ScoredRow};
use posters::PosterLookupResult;

/// Why an evaluation produced no result
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Unknown movie title: '{0}'")]
    UnknownTitle(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Similarity task failed: {0}")]
    TaskFailed(String),
}

/// A movie from the similarity gallery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMovie {
    pub row: RowIndex,
    pub score: f32,
    pub poster: PosterLookupResult,
}

/// Everything shown for one selected movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub row: RowIndex,
    pub title: String,
    pub predicted_rating: f32,
    /// Dataset average vote, shown next to the prediction
    pub reference_rating: f32,
    pub poster: PosterLookupResult,
    pub similar: Vec<SimilarMovie>,
}

impl Evaluation {
    /// Prediction with two decimals, e.g. `7.43/10`
    pub fn predicted_rating_label(&self) -> String {
        format!("{:.2}/10", self.predicted_rating)
    }

    /// Reference rating as stored, e.g. `7.2/10`
    pub fn reference_rating_label(&self) -> String {
        format!("{:?}/10", self.reference_rating)
    }
}

#[derive(Clone)]
pub struct RatingOrchestrator {
    context: AppContext,
}

impl RatingOrchestrator {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn index(&self) -> &DataIndex {
        self.context.index()
    }

    /// Catalog titles in catalog order, for the selection list
    pub fn titles(&self) -> Vec<String> {
        self.index().titles().map(str::to_string).collect()
    }

    /// Predict, rank, and resolve posters for one title.
    #[instrument(skip(self))]
    pub async fn evaluate(&self, title: &str) -> Result<Evaluation, EvaluationError> {
        let start_time = Instant::now();

        let row = self
            .index()
            .find_by_title(title)
            .ok_or_else(|| EvaluationError::UnknownTitle(title.to_string()))?;
        let movie = self
            .index()
            .movie(row)
            .ok_or_else(|| EvaluationError::UnknownTitle(title.to_string()))?;

        let predicted_rating = self.context.engine.predict_rating(row).await?;
        let neighbours = self.rank_neighbours(row).await?;
        info!(
            "Predicted {:.2} for '{}', ranked {} neighbours",
            predicted_rating,
            movie.title,
            neighbours.len()
        );

        // Selected poster first, then the neighbours in rank order
        let mut lookups: Vec<(ExternalId, String)> = Vec::with_capacity(neighbours.len() + 1);
        lookups.push((movie.external_id, movie.title.clone()));
        for neighbour in &neighbours {
            let record = self
                .index()
                .movie(neighbour.row)
                .ok_or(EngineError::RowOutOfBounds {
                    row: neighbour.row,
                    len: self.index().len(),
                })?;
            lookups.push((record.external_id, record.title.clone()));
        }

        let mut posters = self.context.posters.resolve_all(lookups).await.into_iter();
        let poster = posters
            .next()
            .unwrap_or_else(|| PosterLookupResult::placeholder(movie.title.clone()));
        let similar = neighbours
            .into_iter()
            .zip(posters)
            .map(|(neighbour, poster)| SimilarMovie {
                row: neighbour.row,
                score: neighbour.score,
                poster,
            })
            .collect();

        info!(
            "Evaluated '{}' in {:.2?}",
            movie.title,
            start_time.elapsed()
        );

        Ok(Evaluation {
            row,
            title: movie.title.clone(),
            predicted_rating,
            reference_rating: movie.average_vote,
            poster,
            similar,
        })
    }

    /// Similarity ranking on a blocking thread
    async fn rank_neighbours(&self, row: RowIndex) -> Result<Vec<ScoredRow>, EvaluationError> {
        let engine = self.context.engine.clone();
        let k = self.context.similar_count;
        let ranked = tokio::task::spawn_blocking(move || engine.top_similar(row, k))
            .await
            .map_err(|e| EvaluationError::TaskFailed(e.to_string()))??;
        Ok(ranked)
    }
}
