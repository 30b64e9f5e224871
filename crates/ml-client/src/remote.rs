//! gRPC client for an external rating scorer.
//!
//! The service exposes a single unary call, `rating.RatingScorer/Predict`,
//! taking one feature vector and returning one rating.

use crate::rating::{rating_scorer_client::RatingScorerClient, PredictRequest};
use crate::{ModelError, RatingModel};
use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::{debug, error, info};

/// Client for the remote scoring service.
///
/// Wraps the generated gRPC client; the channel is cheap to clone, so each
/// prediction works on its own clone and the model can be shared.
#[derive(Debug, Clone)]
pub struct RemoteRatingModel {
    client: RatingScorerClient<Channel>,
    service_addr: String,
}

impl RemoteRatingModel {
    /// Connect to the scoring service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ModelError> {
        let addr = addr.into();
        info!("Connecting to ML service at {}", addr);

        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| ModelError::ConnectionError(format!("invalid address {}: {}", addr, e)))?
            .connect()
            .await
            .map_err(|e| ModelError::ConnectionError(format!("{}: {}", addr, e)))?;

        Ok(Self {
            client: RatingScorerClient::new(channel),
            service_addr: addr,
        })
    }

    /// Get the address of the ML service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}

#[async_trait]
impl RatingModel for RemoteRatingModel {
    fn name(&self) -> &str {
        "remote"
    }

    fn expected_width(&self) -> Option<usize> {
        None
    }

    async fn predict(&self, features: &[f32]) -> Result<f32, ModelError> {
        debug!("Requesting prediction for a {}-wide vector", features.len());

        let request = tonic::Request::new(PredictRequest {
            features: features.to_vec(),
        });

        let mut client = self.client.clone();
        let response = client.predict(request).await.map_err(|status| {
            error!("gRPC error while predicting rating: {}", status);
            ModelError::RpcError(status.message().to_string())
        })?;

        let rating = response.into_inner().rating;
        if rating.is_finite() {
            Ok(rating)
        } else {
            Err(ModelError::InvalidPrediction(rating))
        }
    }
}
