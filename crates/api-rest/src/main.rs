//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! the survey pages and OpenAPI/Swagger UI). The workspace's main `glyco-run` binary runs both
//! gRPC and REST concurrently.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use api_shared::config::{core_config_from_env, DEFAULT_REST_ADDR, REST_ADDR_ENV};
use api_shared::SurveyPipeline;

/// Main entry point for the Glyco REST API server
///
/// # Environment Variables
/// - `GLYCO_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `GLYCO_MODEL_PATH`: Classifier artifact (default: `model/model.json`)
/// - `GLYCO_REQUIRE_CHECKSUM`: Refuse artifacts without a `.sha256` sidecar (default: false)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the classifier artifact cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("glyco_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(core_config_from_env()?);
    let pipeline = SurveyPipeline::load(cfg)?;

    tracing::info!("-- Starting Glyco REST API on {}", addr);

    let app = router(AppState { pipeline });
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
