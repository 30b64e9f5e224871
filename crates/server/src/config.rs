use data_loader::ArtifactPaths;
use ml_client::ModelSource;
use posters::PosterConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the three artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Coefficient artifact for the in-process model
    #[serde(default = "default_model_file")]
    pub model_file: String,

    #[serde(default = "default_vectors_file")]
    pub vectors_file: String,

    /// Remote scorer address; when set it replaces the coefficient artifact
    #[serde(default)]
    pub ml_service_addr: Option<String>,

    /// TMDB API key; posters fall back to the placeholder when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_image_base: String,

    /// Per-lookup timeout, 0 disables it
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Size of the similar-movies gallery
    #[serde(default = "default_similar_count")]
    pub similar_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_catalog_file() -> String {
    "movie_dict.json".to_string()
}

fn default_model_file() -> String {
    "rating_model.json".to_string()
}

fn default_vectors_file() -> String {
    "vectorized_tags.txt".to_string()
}

fn default_tmdb_api_url() -> String {
    posters::client::DEFAULT_API_URL.to_string()
}

fn default_tmdb_image_base() -> String {
    posters::client::DEFAULT_IMAGE_BASE.to_string()
}

fn default_poster_timeout_secs() -> u64 {
    10
}

fn default_similar_count() -> usize {
    engine::DEFAULT_TOP_K
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            catalog_file: default_catalog_file(),
            model_file: default_model_file(),
            vectors_file: default_vectors_file(),
            ml_service_addr: None,
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_base: default_tmdb_image_base(),
            poster_timeout_secs: default_poster_timeout_secs(),
            similar_count: default_similar_count(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            catalog: self.catalog_file.clone(),
            vectors: self.vectors_file.clone(),
        }
    }

    pub fn model_source(&self) -> ModelSource {
        match self.ml_service_addr.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => ModelSource::Remote(addr.to_string()),
            _ => ModelSource::Linear(self.artifacts_dir.join(&self.model_file)),
        }
    }

    pub fn poster_config(&self) -> PosterConfig {
        PosterConfig {
            api_key: self
                .tmdb_api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            api_url: self.tmdb_api_url.clone(),
            image_base: self.tmdb_image_base.clone(),
            timeout: (self.poster_timeout_secs > 0)
                .then(|| Duration::from_secs(self.poster_timeout_secs)),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        envy::from_iter::<_, Config>(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8501");
        assert_eq!(config.similar_count, 5);
        assert_eq!(
            config.model_source(),
            ModelSource::Linear(PathBuf::from("artifacts/rating_model.json"))
        );
        assert!(config.poster_config().api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("ARTIFACTS_DIR", "/data"),
            ("VECTORS_FILE", "vectors.json"),
            ("ML_SERVICE_ADDR", "http://localhost:50051"),
            ("TMDB_API_KEY", "abc"),
            ("POSTER_TIMEOUT_SECS", "0"),
            ("SIMILAR_COUNT", "3"),
            ("PORT", "9000"),
        ]);

        assert_eq!(config.artifact_paths().vectors, "vectors.json");
        assert_eq!(
            config.model_source(),
            ModelSource::Remote("http://localhost:50051".to_string())
        );
        let posters = config.poster_config();
        assert_eq!(posters.api_key.as_deref(), Some("abc"));
        assert!(posters.timeout.is_none());
        assert_eq!(config.similar_count, 3);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_blank_values_are_treated_as_unset() {
        let config = from_pairs(&[("TMDB_API_KEY", "  "), ("ML_SERVICE_ADDR", "")]);
        assert!(config.poster_config().api_key.is_none());
        assert!(matches!(config.model_source(), ModelSource::Linear(_)));
    }
}
