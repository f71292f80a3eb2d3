use axum::{http::StatusCode, routing::get, serve, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

pub struct HttpServer {
    api: Router,
    config: HttpServerConfig,
}

impl HttpServer {
    /// `api` holds the resource routes; they are mounted under `/api`.
    pub async fn new(api: Router, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self { api, config })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = app(self.api);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

/// Full application router: `/health`, the API under `/api`, request tracing.
pub fn app(api: Router) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            let request_id = Uuid::new_v4();
            tracing::info_span!(
                "http_request",
                %request_id,
                method = %request.method(),
                uri
            )
        })
        .on_request(
            |request: &axum::extract::Request<_>, span: &tracing::Span| {
                tracing::info!(
                    parent: span,
                    method = %request.method(),
                    uri = %request.uri(),
                    "request"
                );
            },
        )
        .on_response(
            |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                tracing::info!(
                    parent: span,
                    status = %response.status(),
                    latency_ms = %latency.as_millis(),
                    "response"
                );
            },
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(trace_layer)
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
