use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use repo2resume_api::config::Config;
use repo2resume_api::logging;
use repo2resume_api::routes::build_router;
use repo2resume_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing credentials)
    let config = Config::from_env()?;

    logging::init("api", &config.rust_log);

    info!("Starting repo2resume API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(&config).await?;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
