use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints on open paths. The gate classifies both as open, so they answer the same
/// way for anonymous and signed-in callers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(handlers::health))
        // GET /session
        // Echoes whether a credential is attached and the role from the profile cookie.
        .route("/session", get(handlers::get_session))
}
