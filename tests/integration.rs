//! Integration tests: health, generated worker script, on-demand generation.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pwa_kit::{create_app, generate, AppState, GeneratorConfig};
use tower::util::ServiceExt;

fn test_config() -> GeneratorConfig {
    GeneratorConfig::new("app-test", vec!["/".to_string(), "/a.js".to_string()])
        .with_network_first(vec!["/api/".to_string()])
}

fn test_state() -> AppState {
    AppState::new(test_config(), "/sw.js").unwrap()
}

async fn body_string(res: axum::response::Response) -> String {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = create_app(test_state());
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
    assert_eq!(json.get("cacheName").and_then(|v| v.as_str()), Some("app-test"));
}

#[tokio::test]
async fn service_worker_is_served_uncached() {
    let app = create_app(test_state());
    let req = Request::builder()
        .uri("/sw.js")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript; charset=utf-8"
    );
    assert_eq!(
        res.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(res.headers().get("service-worker-allowed").unwrap(), "/");
    assert_eq!(body_string(res).await, generate(&test_config()).unwrap());
}

#[tokio::test]
async fn custom_worker_path() {
    let app = create_app(AppState::new(test_config(), "/static/worker.js").unwrap());
    let req = Request::builder()
        .uri("/static/worker.js")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn generate_on_demand() {
    let app = create_app(test_state());
    let body = serde_json::json!({
        "cacheName": "posted-v1",
        "precacheUrls": ["/", "/app.js"],
        "networkOnlyPrefixes": ["/auth/"]
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/service-worker")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let expected = generate(
        &GeneratorConfig::new("posted-v1", vec!["/".to_string(), "/app.js".to_string()])
            .with_network_only(vec!["/auth/".to_string()]),
    )
    .unwrap();
    assert_eq!(body_string(res).await, expected);
}

#[tokio::test]
async fn generate_rejects_missing_cache_name() {
    let app = create_app(test_state());
    let body = serde_json::json!({ "precacheUrls": ["/"] });
    let req = Request::builder()
        .method("POST")
        .uri("/api/service-worker")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST, "missing cacheName should be 400");
    let json: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("cacheName"));
}

#[tokio::test]
async fn generate_accepts_relative_urls() {
    let app = create_app(test_state());
    let body = serde_json::json!({
        "cacheName": "v1",
        "precacheUrls": ["./", "./app.js", "index.html"],
        "navigationFallback": "index.html",
        "networkFirstPrefixes": ["api/"]
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/service-worker")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("\"./app.js\""));
}
