//! Server crate for the movie rating predictor.
//!
//! Loads the artifacts and model once at startup (`context`), runs one
//! evaluation per request (`orchestrator`), and serves the result as an HTML
//! page or JSON (`render`, `routes`).

pub mod config;
pub mod context;
pub mod orchestrator;
pub mod render;
pub mod routes;

pub use config::Config;
pub use context::AppContext;
pub use orchestrator::{Evaluation, EvaluationError, RatingOrchestrator, SimilarMovie};
pub use routes::create_router;

/// Install the tracing subscriber shared by the binaries
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,server=debug,engine=debug,posters=info,tower_http=info".into()
            }),
        )
        .init();
}
