//! Firechem Web Server
//!
//! Run with: cargo run -p firechem-web

use std::net::SocketAddr;

use firechem_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Firechem Web Server...");

    let state = firechem_web::state::AppState::from_config(&config)?;
    info!(
        chemicals = state.db.chemicals().len(),
        rules = state.db.rules().len(),
        predictor = state.predictor_mode(),
        "Dataset loaded"
    );

    let app = firechem_web::router::build_router(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
