//! Movie rating predictor web server.
//!
//! Any startup failure (missing artifact, bad model, width mismatch, bind
//! error) ends the process with a non-zero exit code before serving.

use anyhow::{Context, Result};
use tracing::info;

use server::{create_router, init_tracing, AppContext, Config, RatingOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!("Starting rating predictor with artifacts from {:?}", config.artifacts_dir);

    let context = AppContext::load(&config).await?;
    let app = create_router(RatingOrchestrator::new(context));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
