use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    error_handling::HandleErrorLayer, http::header, middleware::from_fn, response::IntoResponse,
    routing::get, Router,
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// HTTP host: wraps resource routes with the shared middleware stack and
/// serves them until the shutdown future resolves.
#[derive(Debug, Clone)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    timeout: Duration,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request handler timeout; zero keeps the default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    /// Build the HTTP router around the given resource routes.
    ///
    /// `openapi` is served at `/openapi.json` only when `enable_docs` is set.
    pub fn build_router(&self, routes: Router, openapi: Option<utoipa::openapi::OpenApi>) -> Result<Router> {
        tracing::debug!("Building router");
        let mut router = routes
            .route("/health", get(web::health_check))
            .route("/hello-world", get(web::hello_world));

        if self.config.enable_docs {
            if let Some(doc) = openapi {
                let value = Arc::new(serde_json::to_value(doc)?);
                router = router.route(
                    "/openapi.json",
                    get(move || {
                        let v = value.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], axum::Json((*v).clone()))
                                .into_response()
                        }
                    }),
                );
                tracing::info!("OpenAPI document served at /openapi.json");
            }
        }

        // Layers wrap from the inside out; the last one added sees the request first:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(web::handle_middleware_error))
                .layer(TimeoutLayer::new(self.timeout)),
        );

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Resolve the bind address: `bind_addr` when set, otherwise `host:port`.
    pub fn bind_addr(&self, host: &str, port: u16) -> Result<SocketAddr> {
        let raw = if self.config.bind_addr.trim().is_empty() {
            format!("{host}:{port}")
        } else {
            self.config.bind_addr.trim().to_string()
        };
        raw.parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", raw, e))
    }

    /// Bind `addr` and serve `router` until `shutdown` resolves.
    pub async fn serve<F>(&self, addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);
        serve_listener(listener, router, shutdown).await
    }
}

/// Serve on an already bound listener with graceful shutdown.
pub async fn serve_listener<F>(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
