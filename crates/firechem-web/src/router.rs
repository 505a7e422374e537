//! Axum router — maps all URL paths to handlers.

use std::sync::Arc;

use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::error::handle_panic;
use crate::handlers::{
    chemicals::list_chemicals,
    predict::predict,
    search::{search_get, search_post},
    system::health,
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/predict",   post(predict))
        .route("/api/search",    get(search_get).post(search_post))
        .route("/api/chemicals", get(list_chemicals))
        .route("/api/health",    get(health))

        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
            info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %req.method(),
                path = %req.uri().path(),
            )
        }))
        .with_state(shared)
}
