use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{GlycoService, auth_interceptor};
use api_rest::{AppState, router};
use api_shared::SurveyPipeline;
use api_shared::config::{
    DEFAULT_GRPC_ADDR, DEFAULT_REST_ADDR, GRPC_ADDR_ENV, REST_ADDR_ENV, core_config_from_env,
};
use api_shared::pb::glyco_server::GlycoServer;

/// Main entry point for the Glyco application
///
/// Loads the classifier artifact once, then starts both servers concurrently over it:
/// - gRPC server on port 50051 (configurable via GLYCO_ADDR)
/// - REST server on port 3000 (configurable via GLYCO_REST_ADDR)
///
/// The gRPC server requires authentication via x-api-key header.
/// The REST server serves the survey pages and JSON API without authentication.
///
/// # Environment Variables
/// - `GLYCO_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `GLYCO_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `GLYCO_MODEL_PATH`: Classifier artifact (default: `model/model.json`)
/// - `GLYCO_REQUIRE_CHECKSUM`: Refuse artifacts without a `.sha256` sidecar
/// - `API_KEY`: API key for gRPC authentication
///
/// # Returns
/// * `Ok(())` - If servers start and run successfully
/// * `Err(anyhow::Error)` - If the artifact cannot be loaded, or server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glyco_run=info".parse()?)
                .add_directive("glyco_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("api_grpc=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let grpc_addr: SocketAddr = std::env::var(GRPC_ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_GRPC_ADDR.into())
        .parse()?;
    let rest_addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(core_config_from_env()?);
    let pipeline = SurveyPipeline::load(cfg)?;

    tracing::info!("++ Starting Glyco gRPC on {}", grpc_addr);
    tracing::info!("++ Starting Glyco REST on {}", rest_addr);

    let rest_app = router(AppState {
        pipeline: pipeline.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_server = async move { axum::serve(listener, rest_app).await };

    let grpc_server = Server::builder()
        .add_service(GlycoServer::with_interceptor(
            GlycoService::new(pipeline),
            auth_interceptor,
        ))
        .serve(grpc_addr);

    // Run both
    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result?;
    grpc_result?;

    Ok(())
}
