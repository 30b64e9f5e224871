//! Rating prediction and similar-movie ranking.
//!
//! ## Components
//!
//! - **cosine**: cosine similarity with the zero-norm policy
//! - **ranking**: scoring a row against the matrix and picking the top k
//! - **engine**: `RatingEngine`, tying the artifacts to the rating model
//!
//! ## Example Usage
//! ```ignore
//! use engine::{RatingEngine, DEFAULT_TOP_K};
//!
//! let engine = RatingEngine::new(index.clone(), model)?;
//! let row = index.find_by_title("Avatar").unwrap();
//!
//! let rating = engine.predict_rating(row).await?;
//! let similar = engine.top_similar(row, DEFAULT_TOP_K)?;
//! ```

pub mod cosine;
pub mod engine;
pub mod ranking;

// Re-export main types
pub use cosine::cosine_similarity;
pub use engine::{EngineError, RatingEngine};
pub use ranking::{DEFAULT_TOP_K, ScoredRow};
