use crate::{
    auth::Session,
    models::{NotFound, SessionSummary},
};
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::IntoResponse,
};

/// health
///
/// [Open Route] Liveness probe for load balancers.
pub async fn health() -> &'static str {
    "ok"
}

/// get_session
///
/// [Open Route] Reports what the gate sees for the calling request: whether a
/// credential is attached and which role the profile cookie names.
pub async fn get_session(session: Session) -> Json<SessionSummary> {
    let role = session
        .profile
        .as_ref()
        .and_then(|profile| profile.role.as_ref())
        .map(|role| role.as_str().to_string());

    Json(SessionSummary {
        authenticated: session.is_authenticated(),
        role,
    })
}

/// not_found
///
/// Fallback for any request that passed the gate but matched no route.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            error: "not_found".to_string(),
            path: uri.path().to_string(),
        }),
    )
}
