//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// Apart from the health endpoint, every path is a link: the fallback
/// handler classifies it as a signed or simple link by shape.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health_check))
        .fallback(handlers::dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
