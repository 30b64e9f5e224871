//! Application context: everything loaded once at startup.
//!
//! Every failure here is fatal. The process never starts serving with a
//! partially loaded context.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use data_loader::DataIndex;
use engine::RatingEngine;
use ml_client::RatingModel;
use posters::PosterResolver;

/// Immutable, shareable context passed to every request
#[derive(Clone)]
pub struct AppContext {
    pub engine: RatingEngine,
    pub posters: PosterResolver,
    pub similar_count: usize,
}

impl AppContext {
    /// Assemble a context from parts that are already loaded
    pub fn new(
        index: Arc<DataIndex>,
        model: Arc<dyn RatingModel>,
        posters: PosterResolver,
        similar_count: usize,
    ) -> Result<Self> {
        let engine = RatingEngine::new(index, model)
            .context("Rating model does not match the feature vectors")?;
        Ok(Self {
            engine,
            posters,
            similar_count,
        })
    }

    /// Load artifacts, model, and poster client from configuration
    pub async fn load(config: &Config) -> Result<Self> {
        let start = Instant::now();

        let data_dir = config.artifacts_dir.clone();
        let paths = config.artifact_paths();
        let index = tokio::task::spawn_blocking(move || DataIndex::load_from_files(&data_dir, &paths))
            .await
            .context("Artifact loading task panicked")?
            .with_context(|| {
                format!("Failed to load artifacts from {}", config.artifacts_dir.display())
            })?;

        let source = config.model_source();
        let model = ml_client::load_model(&source)
            .await
            .with_context(|| format!("Failed to load rating model from {:?}", source))?;

        let posters = PosterResolver::from_config(config.poster_config())
            .context("Failed to build poster client")?;
        if posters.is_offline() {
            info!("TMDB_API_KEY not set, posters will use the placeholder image");
        }

        let context = Self::new(Arc::new(index), model, posters, config.similar_count)?;
        info!(
            "Loaded {} movies ({} features, model: {}) in {:.2?}",
            context.engine.index().len(),
            context.engine.index().feature_width(),
            context.engine.model().name(),
            start.elapsed()
        );
        Ok(context)
    }

    pub fn index(&self) -> &Arc<DataIndex> {
        self.engine.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_artifacts(dir: &TempDir, coefficients: &str) {
        fs::write(
            dir.path().join("movie_dict.json"),
            r#"{"title": ["Avatar", "Spectre"], "movie_id": [19995, 206647], "vote_average": [7.2, 6.3]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("vectorized_tags.txt"), "1 0\n0 1\n").unwrap();
        fs::write(
            dir.path().join("rating_model.json"),
            format!(r#"{{"coef_": {}, "intercept_": 5.0}}"#, coefficients),
        )
        .unwrap();
    }

    fn config_for(dir: &TempDir) -> Config {
        Config {
            artifacts_dir: dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_load_context() {
        let dir = TempDir::new().unwrap();
        write_artifacts(&dir, "[1.0, 2.0]");

        let context = AppContext::load(&config_for(&dir)).await.unwrap();
        assert_eq!(context.index().len(), 2);
        assert_eq!(context.similar_count, 5);
        assert!(context.posters.is_offline());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifacts(&dir, "[1.0, 2.0]");
        fs::remove_file(dir.path().join("vectorized_tags.txt")).unwrap();

        let err = AppContext::load(&config_for(&dir)).await.err().unwrap();
        assert!(format!("{:#}", err).contains("vectorized_tags.txt"));
    }

    #[tokio::test]
    async fn test_model_width_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_artifacts(&dir, "[1.0, 2.0, 3.0]");

        let err = AppContext::load(&config_for(&dir)).await.err().unwrap();
        assert!(format!("{:#}", err).contains("does not match"));
    }
}
