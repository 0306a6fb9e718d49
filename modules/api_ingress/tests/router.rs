use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get as get_route, post},
    Router,
};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig};

#[derive(OpenApi)]
#[openapi(info(title = "Test API", version = "0.0.1"))]
struct TestDoc;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_healthy_with_timestamp() {
    let app = ApiIngress::default().build_router(Router::new(), None).unwrap();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    let ts = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn hello_world_greets() {
    let app = ApiIngress::default().build_router(Router::new(), None).unwrap();

    let response = app.oneshot(get("/hello-world")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Hello world");
}

#[tokio::test]
async fn openapi_served_only_when_docs_enabled() {
    let disabled = ApiIngress::default()
        .build_router(Router::new(), Some(TestDoc::openapi()))
        .unwrap();
    let response = disabled.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let enabled = ApiIngress::new(ApiIngressConfig {
        enable_docs: true,
        ..Default::default()
    })
    .build_router(Router::new(), Some(TestDoc::openapi()))
    .unwrap();
    let response = enabled.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store"
    );
    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "Test API");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let routes = Router::new().route("/echo", post(|body: String| async move { body }));
    let app = ApiIngress::default().build_router(routes, None).unwrap();

    let big = "x".repeat(16 * 1024 * 1024 + 1);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header("content-length", big.len())
                .body(Body::from(big))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_present_when_enabled() {
    let app = ApiIngress::new(ApiIngressConfig {
        cors_enabled: true,
        ..Default::default()
    })
    .build_router(Router::new(), None)
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn slow_handlers_time_out_with_message_body() {
    let routes = Router::new().route(
        "/slow",
        get_route(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "done"
        }),
    );
    let app = ApiIngress::default()
        .with_timeout(Duration::from_millis(20))
        .build_router(routes, None)
        .unwrap();

    let response = app.oneshot(get("/slow")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "unexpected server error"})
    );
}
