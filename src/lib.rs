use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;

pub mod routes;
use routes::public;

// --- Public Re-exports ---

pub use auth::Session;
pub use config::AppConfig;
pub use gate::{Decision, GateRequest, GateState, RouteClass, RouteGate};

/// AppState
///
/// The single, immutable container shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// The request gate, built once from the configured route tables.
    pub gate: GateState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            gate: Arc::new(RouteGate::new(&config.gate)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for GateState {
    fn from_ref(app_state: &AppState) -> GateState {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// gate_middleware
///
/// Applies the request gate to every request that is not excluded (APIs, build
/// assets, images). A redirect decision answers with `307 Temporary Redirect`;
/// otherwise the request continues to routing.
async fn gate_middleware(
    State(gate): State<GateState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if gate.is_excluded(path) {
        tracing::trace!(path, "Path excluded from gate");
        return next.run(request).await;
    }

    let gate_request = GateRequest {
        path: path.to_string(),
        credential: session.credential,
        profile: session.profile,
        redirect: None,
    }
    .with_query(request.uri().query());

    match gate.decide(&gate_request) {
        Decision::Continue => next.run(request).await,
        Decision::Redirect { location, reason } => {
            tracing::debug!(
                path = %gate_request.path,
                class = ?gate.classify(&gate_request.path),
                reason = ?reason,
                location = %location,
                "Gate redirect"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, wraps it in the request gate and the
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    // A plain `layer`, not `route_layer`: protected paths must redirect even when only
    // the fallback would match them.
    let base_router = Router::new()
        .merge(public::public_routes())
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate_middleware,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span so every log line for a request carries its
/// `x-request-id` alongside the method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
