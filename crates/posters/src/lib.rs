//! # Posters Crate
//!
//! Resolves poster images for catalog movies through the TMDB API.
//!
//! - **client**: `TmdbClient`, one typed lookup returning `Result<String, PosterError>`
//! - **resolver**: `PosterResolver`, turning every failure into the placeholder
//!   image and running lookups concurrently

pub mod client;
pub mod resolver;

pub use client::{PosterConfig, PosterError, TmdbClient};
pub use resolver::{PLACEHOLDER_POSTER_URL, PosterLookupResult, PosterResolver};
