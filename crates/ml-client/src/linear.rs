//! In-process linear regressor.
//!
//! The artifact is the fitted parameters of the trained regressor as JSON:
//!
//! ```json
//! {"coefficients": [0.12, -0.03, ...], "intercept": 6.1}
//! ```
//!
//! scikit-learn's attribute names (`coef_`, `intercept_`) are accepted too.

use crate::{ModelError, RatingModel};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    #[serde(alias = "coef_", alias = "coef")]
    coefficients: Vec<f32>,
    #[serde(alias = "intercept_")]
    intercept: f32,
}

/// rating = intercept + coefficients · features
#[derive(Debug, Clone)]
pub struct LinearRatingModel {
    coefficients: Vec<f32>,
    intercept: f32,
}

impl LinearRatingModel {
    /// Build a model from fitted parameters.
    ///
    /// Rejects an empty coefficient vector and non-finite parameters.
    pub fn new(coefficients: Vec<f32>, intercept: f32) -> Result<Self, ModelError> {
        if coefficients.is_empty() {
            return Err(ModelError::InvalidModel("model has no coefficients".into()));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidModel(
                "model parameters must be finite".into(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Load the coefficient artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let load_error = |reason: String| ModelError::LoadError {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let artifact: LinearArtifact =
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        let model = Self::new(artifact.coefficients, artifact.intercept)?;

        info!(
            "Loaded linear rating model from {:?} ({} coefficients)",
            path,
            model.coefficients.len()
        );
        Ok(model)
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    fn evaluate(&self, features: &[f32]) -> Result<f32, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        // Accumulate in f64; a f32 running sum drifts on wide vectors
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| f64::from(*c) * f64::from(*x))
            .sum();
        let rating = (f64::from(self.intercept) + dot) as f32;

        if rating.is_finite() {
            Ok(rating)
        } else {
            Err(ModelError::InvalidPrediction(rating))
        }
    }
}

#[async_trait]
impl RatingModel for LinearRatingModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn expected_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    async fn predict(&self, features: &[f32]) -> Result<f32, ModelError> {
        self.evaluate(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_predict() {
        let model = LinearRatingModel::new(vec![0.5, -1.0, 2.0], 6.0).unwrap();
        let rating = model.predict(&[2.0, 1.0, 0.25]).await.unwrap();
        assert_eq!(rating, 6.5);
    }

    #[tokio::test]
    async fn test_predict_is_deterministic() {
        let model = LinearRatingModel::new(vec![0.1, 0.2, 0.3, 0.4], 5.5).unwrap();
        let features = [1.0, 0.0, 3.0, 1.0];
        let first = model.predict(&features).await.unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict(&features).await.unwrap().to_bits(), first.to_bits());
        }
    }

    #[tokio::test]
    async fn test_predict_rejects_wrong_width() {
        let model = LinearRatingModel::new(vec![1.0, 1.0], 0.0).unwrap();
        let err = model.predict(&[1.0]).await.unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(LinearRatingModel::new(vec![], 1.0).is_err());
        assert!(LinearRatingModel::new(vec![f32::INFINITY], 1.0).is_err());
        assert!(LinearRatingModel::new(vec![1.0], f32::NAN).is_err());
    }

    #[test]
    fn test_load_sklearn_attribute_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rating_model.json");
        std::fs::write(&path, r#"{"coef_": [0.25, 0.75], "intercept_": 4.0}"#).unwrap();

        let model = LinearRatingModel::load(&path).unwrap();
        assert_eq!(model.coefficients(), &[0.25, 0.75]);
        assert_eq!(model.intercept(), 4.0);
    }

    #[test]
    fn test_load_reports_path() {
        let err = LinearRatingModel::load(Path::new("/nonexistent/rating_model.json")).unwrap_err();
        assert!(err.to_string().contains("rating_model.json"));
    }
}
