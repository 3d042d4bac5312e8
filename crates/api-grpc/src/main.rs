//! Standalone gRPC server binary.
//!
//! Runs the gRPC API on its own. The workspace's main `glyco-run` binary runs both gRPC and REST
//! concurrently.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{auth_interceptor, pb::glyco_server::GlycoServer, GlycoService};
use api_shared::config::{
    core_config_from_env, reflection_enabled, DEFAULT_GRPC_ADDR, GRPC_ADDR_ENV,
};
use api_shared::{SurveyPipeline, FILE_DESCRIPTOR_SET};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_grpc=info".parse()?)
                .add_directive("glyco_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var(GRPC_ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_GRPC_ADDR.into())
        .parse()?;

    let cfg = Arc::new(core_config_from_env()?);
    let pipeline = SurveyPipeline::load(cfg)?;

    tracing::info!("-- Starting Glyco gRPC on {}", addr);

    let mut server_builder = Server::builder().add_service(GlycoServer::with_interceptor(
        GlycoService::new(pipeline),
        auth_interceptor,
    ));

    if reflection_enabled()? {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
