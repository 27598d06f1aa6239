use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use event_gate::{AppConfig, AppState, create_router, models::SessionSummary};
use tower::ServiceExt;

// --- Helper Functions ---

fn app() -> Router {
    create_router(AppState::new(AppConfig::default()))
}

async fn send(uri: &str, cookies: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    app()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect without Location header")
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_health_is_open() {
    let response = send("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_protected_path_redirects_anonymous_to_login() {
    let response = send("/dashboard/admin", None).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/auth/login?redirect=%2Fdashboard%2Fadmin"
    );
}

#[tokio::test]
async fn test_protected_path_with_credential_reaches_routing() {
    // No page is mounted here, so a pass-through lands on the not-found fallback.
    let response = send("/bookings", Some("auth_token=abc")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["path"], "/bookings");
}

#[tokio::test]
async fn test_login_with_vendor_profile_redirects_to_vendor_dashboard() {
    let response = send(
        "/auth/login",
        Some("auth_token=abc; user_data=%7B%22role%22%3A%22vendor%22%7D"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard/vendor");
}

#[tokio::test]
async fn test_login_with_pending_destination() {
    let response = send(
        "/auth/login?redirect=%2Fbookings",
        Some("auth_token=abc; user_data=%7B%22role%22%3A%22admin%22%7D"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/bookings");
}

#[tokio::test]
async fn test_login_with_malformed_profile_goes_home() {
    let response = send("/auth/register", Some("auth_token=abc; user_data=%7Bbroken")).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_with_non_string_role_goes_to_user_dashboard() {
    let response = send(
        "/auth/login",
        Some("auth_token=abc; user_data=%7B%22role%22%3A7%7D"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard/user");
}

#[tokio::test]
async fn test_open_path_passes_through_anonymously() {
    let response = send("/events", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_excluded_paths_bypass_gate() {
    // `/api` prefixes would otherwise be open anyway; an image under a protected
    // prefix shows the bypass.
    let response = send("/dashboard/banner.png", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send("/api/bookings", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_echo() {
    let response = send(
        "/session",
        Some("auth_token=abc; user_data=%7B%22role%22%3A%22organizer%22%7D"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let summary: SessionSummary = body_json(response).await;
    assert_eq!(
        summary,
        SessionSummary {
            authenticated: true,
            role: Some("organizer".to_string()),
        }
    );
}

#[tokio::test]
async fn test_session_echo_anonymous() {
    let response = send("/session", None).await;

    let summary: SessionSummary = body_json(response).await;
    assert!(!summary.authenticated);
    assert_eq!(summary.role, None);
}
