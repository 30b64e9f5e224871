//! Rating model client.
//!
//! The regression model is opaque to the rest of the system: it takes one
//! feature vector and returns one predicted rating. This crate provides that
//! capability behind the `RatingModel` trait, with two backends:
//! - `LinearRatingModel`: fitted coefficients exported from the trained
//!   regressor, evaluated in-process
//! - `RemoteRatingModel`: a gRPC client for an external scoring service, for
//!   estimators that cannot be exported as coefficients

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod linear;
pub mod remote;

/// gRPC messages and the generated client/server for the scoring service
pub mod rating {
    include!(concat!(env!("OUT_DIR"), "/rating.RatingScorer.rs"));

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PredictRequest {
        #[prost(float, repeated, tag = "1")]
        pub features: ::prost::alloc::vec::Vec<f32>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PredictResponse {
        #[prost(float, tag = "1")]
        pub rating: f32,
    }
}

pub use linear::LinearRatingModel;
pub use remote::RemoteRatingModel;

/// Errors that can occur when loading or invoking a rating model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Feature vector has {found} values but the model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Model returned a non-finite rating: {0}")]
    InvalidPrediction(f32),

    #[error("Failed to connect to ML service: {0}")]
    ConnectionError(String),

    #[error("ML service call failed: {0}")]
    RpcError(String),
}

/// A fitted regressor that predicts a rating from one feature vector.
///
/// Implementations are deterministic for a given vector and are shared
/// read-only across requests, hence `Send + Sync`.
#[async_trait]
pub trait RatingModel: Send + Sync {
    /// Short backend name (for logging)
    fn name(&self) -> &str;

    /// Feature width the model was fitted on, when the backend knows it
    fn expected_width(&self) -> Option<usize>;

    /// Predict a rating for one feature vector
    async fn predict(&self, features: &[f32]) -> Result<f32, ModelError>;
}

/// Where the rating model comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Coefficient artifact on disk
    Linear(PathBuf),
    /// Address of a running scoring service (e.g. "http://localhost:50051")
    Remote(String),
}

/// Load or connect to the configured model.
pub async fn load_model(source: &ModelSource) -> Result<Arc<dyn RatingModel>, ModelError> {
    match source {
        ModelSource::Linear(path) => Ok(Arc::new(LinearRatingModel::load(path)?)),
        ModelSource::Remote(addr) => Ok(Arc::new(RemoteRatingModel::connect(addr.clone()).await?)),
    }
}
