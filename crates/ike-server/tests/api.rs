//! Router tests that never need a reachable database: request decoding,
//! input validation, connection failure mapping, and CORS.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ike_core::{ErrorBody, ErrorKind};
use ike_server::config::CorsConfig;
use ike_server::{create_router, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

fn app() -> Router {
    create_router(&ServerConfig::default())
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_body(resp: axum::response::Response) -> ErrorBody {
    serde_json::from_value(body_json(resp).await).unwrap()
}

/// Nothing listens on port 1, so connecting fails immediately.
fn unreachable_creds() -> Value {
    json!({"uri": "bolt://127.0.0.1:1", "password": "secret"})
}

#[tokio::test]
async fn test_health() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_malformed_json_on_nodes_is_rejected() {
    let resp = app()
        .oneshot(post_json("/nodes/", "{\"creds\": {"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = error_body(resp).await;
    assert_eq!(body.kind, ErrorKind::MalformedRequest);
    assert_eq!(body.message, "Malformed request body");
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn test_malformed_json_on_relationships_is_rejected() {
    let resp = app()
        .oneshot(post_json("/relationships/", "not json at all"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(resp).await.kind, ErrorKind::MalformedRequest);
}

#[tokio::test]
async fn test_wrong_shape_is_unprocessable() {
    // Valid JSON, but `creds` is missing.
    let resp = app()
        .oneshot(post_json("/relationships/", r#"{"labels": ["Person"]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = error_body(resp).await;
    assert_eq!(body.kind, ErrorKind::MalformedRequest);
    assert!(body.error.contains("creds"), "unexpected detail: {}", body.error);
}

#[tokio::test]
async fn test_missing_content_type() {
    let req = Request::builder()
        .method("POST")
        .uri("/validate")
        .body(Body::from(unreachable_creds().to_string()))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body = error_body(resp).await;
    assert_eq!(body.kind, ErrorKind::MalformedRequest);
    assert_eq!(body.success, Some(false));
}

#[tokio::test]
async fn test_create_node_rejects_empty_label() {
    let body = json!({
        "creds": unreachable_creds(),
        "node_data": {"label": "", "id": "n1"}
    });
    let resp = app()
        .oneshot(post_json("/nodes/new", body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(resp).await.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_create_relationship_rejects_empty_type() {
    let body = json!({
        "creds": unreachable_creds(),
        "relationship_data": {"source_id": "a", "target_id": "b", "type": " "}
    });
    let resp = app()
        .oneshot(post_json("/relationships/new/", body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(resp).await.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_validate_unreachable_host() {
    let resp = app()
        .oneshot(post_json("/validate", unreachable_creds().to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = error_body(resp).await;
    assert_eq!(body.kind, ErrorKind::Unavailable);
    assert_eq!(body.message, "Database unavailable");
    assert_eq!(body.success, Some(false));
}

#[tokio::test]
async fn test_other_routes_omit_success_flag() {
    let body = json!({"creds": unreachable_creds()});
    let resp = app()
        .oneshot(post_json("/nodes/", body.to_string()))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert!(json.get("success").is_none());
    assert_eq!(json["kind"], "unavailable");
}

#[tokio::test]
async fn test_listing_unreachable_host() {
    let body = json!({"creds": unreachable_creds(), "labels": ["Person"]});
    let resp = app()
        .oneshot(post_json("/nodes/", body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route() {
    let resp = app()
        .oneshot(post_json("/graph/", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/nodes/")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:8080"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_preflight_unknown_origin() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/nodes/")
        .header(header::ORIGIN, "https://evil.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_wildcard_origin() {
    let config = ServerConfig {
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        },
        ..ServerConfig::default()
    };
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/nodes/")
        .header(header::ORIGIN, "https://anywhere.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = create_router(&config).oneshot(req).await.unwrap();

    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .is_none());
}
