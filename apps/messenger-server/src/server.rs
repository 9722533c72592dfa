//! HTTP Server implementation

use anyhow::{Context, Result};
use axum::{http::StatusCode, response::Json, routing::get, Router};
use messenger_webhook::{create_webhook_router, WebhookState};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cli::Args;

pub struct Server {
    args: Args,
    state: Arc<WebhookState>,
}

impl Server {
    pub fn new(args: Args, state: Arc<WebhookState>) -> Self {
        Self { args, state }
    }

    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.args.port));
        let app = build_http_router(self.state);

        info!("HTTP server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind HTTP server")?;

        axum::serve(listener, app.into_make_service())
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

fn build_http_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(create_webhook_router(state))
        .layer(TraceLayer::new_for_http())
}

// Route handlers

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "messenger-server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LoggingEventHandler;
    use axum::{body::Body, http::Request};
    use messenger_webhook::MessengerReceiver;
    use tower::ServiceExt;

    fn router() -> Router {
        let receiver = MessengerReceiver::new("secret", "token");
        build_http_router(Arc::new(WebhookState::new(
            receiver,
            Arc::new(LoggingEventHandler),
        )))
    }

    #[tokio::test]
    async fn test_root_handler() {
        let response = root().await;
        assert_eq!(response.0["service"], "messenger-server");
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_route_mounted() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/webhook?hub.mode=subscribe&hub.verify_token=token&hub.challenge=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
