//! Poster resolution with per-movie fallback.
//!
//! A failed lookup never propagates: the error is logged and the placeholder
//! image is used, so one bad lookup cannot affect the others.

use crate::client::{PosterConfig, PosterError, TmdbClient};
use data_loader::ExternalId;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Shown whenever a poster cannot be resolved
pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/150x225.png?text=No+Image";

/// Title and image to display for one movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterLookupResult {
    pub display_title: String,
    pub image_url: String,
}

impl PosterLookupResult {
    pub fn placeholder(display_title: impl Into<String>) -> Self {
        Self {
            display_title: display_title.into(),
            image_url: PLACEHOLDER_POSTER_URL.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.image_url == PLACEHOLDER_POSTER_URL
    }
}

#[derive(Debug, Clone)]
pub struct PosterResolver {
    client: TmdbClient,
}

impl PosterResolver {
    pub fn new(client: TmdbClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: PosterConfig) -> Result<Self, PosterError> {
        Ok(Self::new(TmdbClient::new(config)?))
    }

    /// Resolver that never touches the network
    pub fn offline() -> Result<Self, PosterError> {
        Self::from_config(PosterConfig::default())
    }

    pub fn is_offline(&self) -> bool {
        self.client.config().api_key.is_none()
    }

    /// Resolve one poster, falling back to the placeholder on any failure.
    #[instrument(skip(self, display_title))]
    pub async fn resolve_poster(&self, external_id: ExternalId, display_title: &str) -> PosterLookupResult {
        match self.client.fetch_poster_url(external_id).await {
            Ok(image_url) => {
                debug!("Resolved poster for movie {}", external_id);
                PosterLookupResult {
                    display_title: display_title.to_string(),
                    image_url,
                }
            }
            Err(PosterError::MissingApiKey) => PosterLookupResult::placeholder(display_title),
            Err(e) => {
                warn!("Poster lookup failed for movie {}: {}", external_id, e);
                PosterLookupResult::placeholder(display_title)
            }
        }
    }

    /// Resolve several posters concurrently.
    ///
    /// Output order equals input order. A lookup task that panics yields the
    /// placeholder for that movie only.
    pub async fn resolve_all(&self, movies: Vec<(ExternalId, String)>) -> Vec<PosterLookupResult> {
        let handles: Vec<_> = movies
            .into_iter()
            .map(|(external_id, title)| {
                let resolver = self.clone();
                let fallback_title = title.clone();
                let handle = tokio::spawn(async move {
                    resolver.resolve_poster(external_id, &title).await
                });
                (fallback_title, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (fallback_title, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Poster task for '{}' failed: {}", fallback_title, e);
                    results.push(PosterLookupResult::placeholder(fallback_title));
                }
            }
        }
        results
    }
}
