//! Inbound webhook handling
//!
//! Exposes the subscription handshake and event delivery over HTTP.

use crate::{
    events::Event,
    receiver::MessengerReceiver,
    signature::{SIGNATURE_256_HEADER, SIGNATURE_HEADER},
    HandlerError, ReceiveError,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Body returned once a delivery has been fully handled
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Consumer of classified events
pub trait EventHandler: Send + Sync {
    /// Handle one event. An error stops the delivery and fails the request.
    fn handle(&self, event: Event) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: Event) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Shared state for webhook routes
pub struct WebhookState {
    receiver: MessengerReceiver,
    handler: Arc<dyn EventHandler>,
}

impl WebhookState {
    pub fn new(receiver: MessengerReceiver, handler: Arc<dyn EventHandler>) -> Self {
        Self { receiver, handler }
    }
}

/// Query parameters of the subscription handshake
#[derive(Debug, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Create Axum router for the Messenger webhook
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/webhook", get(verify_subscription).post(receive_events))
        .with_state(state)
}

/// Handle the subscription handshake
async fn verify_subscription(
    State(state): State<Arc<WebhookState>>,
    Query(query): Query<VerificationQuery>,
) -> Response {
    let mode = query.mode.as_deref().unwrap_or_default();
    let token = query.verify_token.as_deref().unwrap_or_default();

    match state.receiver.verify_webhook(mode, token) {
        Ok(()) => (StatusCode::OK, query.challenge.unwrap_or_default()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handle an event delivery
async fn receive_events(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = Uuid::new_v4();

    // Prefer the SHA-256 header when both are present
    let signature = match [SIGNATURE_256_HEADER, SIGNATURE_HEADER]
        .iter()
        .find_map(|name| headers.get(*name))
        .map(|value| value.to_str())
    {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            warn!(delivery_id = %delivery_id, "Signature header is not valid ASCII");
            return error_response(&ReceiveError::SignatureMismatch(
                "Invalid signature header".to_string(),
            ));
        }
        None => None,
    };

    info!(
        delivery_id = %delivery_id,
        bytes = body.len(),
        signed = signature.is_some(),
        "Received webhook delivery"
    );

    let mut count = 0usize;
    let result = state.receiver.on_receive_events(&body, signature, |event| {
        count += 1;
        state.handler.handle(event)
    });

    match result {
        Ok(()) => {
            info!(delivery_id = %delivery_id, events = count, "Webhook delivery processed");
            (StatusCode::OK, EVENT_RECEIVED).into_response()
        }
        Err(e) => {
            warn!(
                delivery_id = %delivery_id,
                error = %e,
                code = e.error_code(),
                "Webhook delivery rejected"
            );
            error_response(&e)
        }
    }
}

fn error_response(error: &ReceiveError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(serde_json::json!({
            "error": error.error_code(),
            "message": error.to_string(),
        })),
    )
        .into_response()
}
