//! API middleware for request logging, error envelopes and panic recovery.

use crate::error::{ApiError, ErrorDetail, render_error};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{ConnectInfo, OriginalUri, State},
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fmp_client::sink::Event;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Detail rendered for a panicking handler.
pub const PANIC_DETAIL: &str = "Internal server error";

/// Path fragments that are not worth a log line.
const QUIET_SUFFIXES: [&str; 4] = [".svg", ".png", ".jpg", ".ico"];

/// Request logging middleware.
///
/// Logs `REQUEST:` before and `RESPONSE:` after the inner service through the
/// state's sink, and tags every response with an `x-request-id`.
pub async fn log_requests(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
    let quiet = is_quiet_path(uri.path());

    if !quiet {
        let client_ip = extract_client_ip(&request);
        state.sink.emit(
            Event::info(
                "http.request",
                format!("REQUEST: {} {} - Client: {}", method, uri, client_ip),
            )
            .field("request_id", request_id.as_str()),
        );
    }

    let mut response = next.run(request).await;

    if let Some(PanicMessage(message)) = response.extensions().get::<PanicMessage>() {
        state.sink.emit(
            Event::error(
                "http.error",
                format!("Unhandled exception in {} {}: {}", method, uri, message),
            )
            .field("request_id", request_id.as_str()),
        );
    }

    if !quiet {
        let status = response.status().as_u16();
        let elapsed = started.elapsed().as_secs_f64();
        state.sink.emit(
            Event::info(
                "http.response",
                format!(
                    "RESPONSE: {} {} - Status: {} - Time: {:.3}s",
                    method, uri, status, elapsed
                ),
            )
            .field("request_id", request_id.as_str())
            .field("status_code", status),
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Renders `{detail, timestamp, path}` for any response carrying an
/// [`ErrorDetail`] extension.
pub async fn error_envelope(request: Request<Body>, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path().to_string(), |uri| uri.path().to_string());

    let response = next.run(request).await;

    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .map(|ErrorDetail(detail)| detail.clone());
    let Some(detail) = detail else {
        return response;
    };

    let mut rendered = render_error(response.status(), &detail, &path);
    if let Some(panic) = response.extensions().get::<PanicMessage>() {
        rendered.extensions_mut().insert(panic.clone());
    }
    rendered
}

/// Response extension carrying a caught panic's message to [`log_requests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicMessage(pub String);

/// Panic handler for `CatchPanicLayer::custom`.
///
/// The message never reaches the client; it rides along as a
/// [`PanicMessage`] extension so the request log can report it.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    let mut response = ApiError::Internal(PANIC_DETAIL.to_string()).into_response();
    response.extensions_mut().insert(PanicMessage(message));
    response
}

fn is_quiet_path(path: &str) -> bool {
    QUIET_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
        || path.contains("placeholder")
        || path.starts_with("/static")
}

/// Extract client IP from request.
fn extract_client_ip(request: &Request<Body>) -> String {
    // Try X-Forwarded-For header first
    if let Some(forwarded) = request.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        return ip.trim().to_string();
    }

    // Try X-Real-IP header
    if let Some(real_ip) = request.headers().get("X-Real-IP")
        && let Ok(value) = real_ip.to_str()
    {
        return value.to_string();
    }

    // Peer address when served with connect info
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use fmp_client::FmpClient;
    use fmp_client::sink::MemorySink;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    fn test_state() -> (Arc<AppState>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let client =
            FmpClient::with_base_url("http://127.0.0.1:9/stable", "demo", sink.clone()).unwrap();
        (Arc::new(AppState::new(client, sink.clone())), sink)
    }

    fn test_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route(
                "/missing",
                get(|| async { ApiError::NotFound("Company ZZZZ not found".to_string()) }),
            )
            .route(
                "/boom",
                get(|| async {
                    if true {
                        panic!("handler exploded");
                    }
                    ""
                }),
            )
            .route("/favicon.ico", get(|| async { "icon" }))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(axum::middleware::from_fn(error_envelope))
            .layer(axum::middleware::from_fn_with_state(state.clone(), log_requests))
            .with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_extract_client_ip_forwarded() {
        let request = Request::builder()
            .uri("/test")
            .header("X-Forwarded-For", "192.168.1.1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        let ip = extract_client_ip(&request);
        assert_eq!(ip, "192.168.1.1");
    }

    #[test]
    fn test_extract_client_ip_real_ip() {
        let request = Request::builder()
            .uri("/test")
            .header("X-Real-IP", "192.168.1.2")
            .body(Body::empty())
            .unwrap();

        let ip = extract_client_ip(&request);
        assert_eq!(ip, "192.168.1.2");
    }

    #[test]
    fn test_extract_client_ip_connect_info() {
        let mut request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 40000))));

        assert_eq!(extract_client_ip(&request), "10.1.2.3");
    }

    #[test]
    fn test_extract_client_ip_unknown() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let ip = extract_client_ip(&request);
        assert_eq!(ip, "unknown");
    }

    #[test]
    fn test_quiet_paths() {
        assert!(is_quiet_path("/logo.svg"));
        assert!(is_quiet_path("/favicon.ico"));
        assert!(is_quiet_path("/api/placeholder/40/40"));
        assert!(is_quiet_path("/static/app.js"));
        assert!(!is_quiet_path("/api/company/AAPL"));
    }

    #[tokio::test]
    async fn test_log_requests_emits_request_and_response() {
        let (state, sink) = test_state();

        let response = test_router(state)
            .oneshot(
                Request::builder()
                    .uri("/ok")
                    .header("X-Real-IP", "203.0.113.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let requests = sink.named("http.request");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "REQUEST: GET /ok - Client: 203.0.113.9");
        let responses = sink.named("http.response");
        assert_eq!(responses.len(), 1);
        assert!(responses[0].message.starts_with("RESPONSE: GET /ok - Status: 200 - Time: "));
        assert_eq!(requests[0].get("request_id"), responses[0].get("request_id"));
    }

    #[tokio::test]
    async fn test_log_requests_keeps_inbound_request_id() {
        let (state, _) = test_state();

        let response = test_router(state)
            .oneshot(
                Request::builder()
                    .uri("/ok")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    }

    #[tokio::test]
    async fn test_log_requests_skips_quiet_paths() {
        let (state, sink) = test_state();

        let response = test_router(state)
            .oneshot(Request::builder().uri("/favicon.ico").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_error_envelope_renders_detail_and_path() {
        let (state, _) = test_state();

        let response = test_router(state)
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Company ZZZZ not found");
        assert_eq!(body["path"], "/missing");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error_envelope() {
        let (state, sink) = test_state();

        let response = test_router(state)
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["detail"], PANIC_DETAIL);
        assert_eq!(body["path"], "/boom");
        assert!(body.get("stack").is_none());

        let responses = sink.named("http.response");
        assert_eq!(responses[0].get("status_code"), Some(&serde_json::json!(500)));

        let errors = sink.named("http.error");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].level, fmp_client::sink::Level::Error);
        assert_eq!(errors[0].message, "Unhandled exception in GET /boom: handler exploded");
    }

    #[test]
    fn test_panic_response_keeps_message_out_of_detail() {
        let response = panic_response(Box::new("secret state"));

        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ErrorDetail>(),
            Some(&ErrorDetail(PANIC_DETAIL.to_string()))
        );
        assert_eq!(
            response.extensions().get::<PanicMessage>(),
            Some(&PanicMessage("secret state".to_string()))
        );
    }
}
