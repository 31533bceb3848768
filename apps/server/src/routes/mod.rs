//! HTTP routes for the webhook server.

pub mod callback;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// `/api/*` routes.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new().merge(health::router())
}

/// The full application: webhook, API and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(callback::router())
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
