//! QuizHub API server entry point.

use std::sync::Arc;

use quizhub_api::config::ServerConfig;
use quizhub_api::error::AppError;
use quizhub_api::state::AppState;
use quizhub_broadcast::HubRegistry;
use quizhub_core::clock::SystemClock;
use quizhub_core::rng::SystemRng;
use quizhub_session::SessionOrchestrator;
use quizhub_store::InMemoryStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting QuizHub API server");

    let config = ServerConfig::from_env()?;

    let store = Arc::new(InMemoryStore::new());
    match &config.quiz_seed_path {
        Some(path) => {
            store.load_seed_file(path).await?;
        }
        None => warn!("QUIZ_SEED_PATH not set, starting without quizzes"),
    }

    let hubs = Arc::new(HubRegistry::new(config.hub));
    let orchestrator = SessionOrchestrator::new(
        store,
        Arc::clone(&hubs),
        Arc::new(SystemClock),
        Box::new(SystemRng::new()),
    );
    let app = quizhub_api::app(AppState::new(Arc::new(orchestrator)));

    let addr = config.bind_addr()?;
    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hubs.shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
