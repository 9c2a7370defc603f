//! QuizHub API — HTTP and WebSocket surface of the live session engine.
//!
//! Handlers translate requests into orchestrator commands; identity arrives
//! in headers set by the upstream authenticator.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;
pub mod ws;

use state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the front-end origin once it is configurable.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::session::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
