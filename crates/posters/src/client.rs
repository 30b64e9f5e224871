//! TMDB movie-details client.
//!
//! API flow: `GET {api_url}/movie/{id}?api_key=..&language=en-US` returns a
//! JSON document whose `poster_path` is appended to the image base URL.

use data_loader::ExternalId;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a poster lookup failed
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("no TMDB API key configured")]
    MissingApiKey,

    /// Transport failure; the URL (which carries the API key) is stripped
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB returned status {0}")]
    Status(u16),

    #[error("Malformed TMDB response: {0}")]
    MalformedBody(String),

    #[error("TMDB response has no poster_path")]
    MissingPosterPath,
}

/// Connection settings for the image-metadata service
#[derive(Debug, Clone)]
pub struct PosterConfig {
    /// Without a key no request is made and every lookup falls back
    pub api_key: Option<String>,
    pub api_url: String,
    pub image_base: String,
    pub timeout: Option<Duration>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

#[derive(Deserialize)]
struct MovieDetails {
    poster_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    http_client: reqwest::Client,
    config: PosterConfig,
}

impl TmdbClient {
    pub fn new(config: PosterConfig) -> Result<Self, PosterError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Fetch the full poster image URL for a movie.
    pub async fn fetch_poster_url(&self, external_id: ExternalId) -> Result<String, PosterError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(PosterError::MissingApiKey)?;

        let url = format!(
            "{}/movie/{}",
            self.config.api_url.trim_end_matches('/'),
            external_id
        );
        debug!("Fetching poster metadata for movie {}", external_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("language", "en-US")])
            .send()
            .await
            .map_err(|e| PosterError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PosterError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PosterError::Http(e.without_url()))?;
        let details: MovieDetails =
            serde_json::from_str(&body).map_err(|e| PosterError::MalformedBody(e.to_string()))?;

        match details.poster_path {
            Some(path) if !path.trim().is_empty() => Ok(self.image_url(&path)),
            _ => Err(PosterError::MissingPosterPath),
        }
    }

    /// Join the image base and a poster path with exactly one slash
    fn image_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.image_base.trim_end_matches('/'),
            poster_path.trim_start_matches('/')
        )
    }
}
