use axum::{http::StatusCode, response::Json, BoxError};
use serde_json::{json, Value};

const UNEXPECTED_MESSAGE: &str = "unexpected server error";

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn hello_world() -> Json<Value> {
    Json(json!({ "message": "Hello world" }))
}

/// Errors surfaced by the service middleware (timeouts) in the `{message}` shape.
pub async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::error!("request timed out");
    } else {
        tracing::error!("unhandled middleware error: {}", err);
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": UNEXPECTED_MESSAGE })),
    )
}
