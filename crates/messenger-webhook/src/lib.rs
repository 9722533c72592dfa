//! Messenger platform webhook receiver
//!
//! This crate turns raw webhook deliveries into typed events:
//! - Signature verification of the raw body (`sha1=` / `sha256=` HMAC digests)
//! - Envelope validation and the `entry[]` / `messaging[]` walk
//! - Classification of each messaging event into one [`Event`] variant
//! - The subscription handshake (`hub.mode` / `hub.verify_token`)
//! - An axum router exposing both endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use messenger_webhook::{Event, MessengerReceiver};
//!
//! let receiver = MessengerReceiver::new("app-secret", "verify-token");
//!
//! receiver.on_receive_events(body, signature_header, |event: Event| {
//!     if event.is_text_message() {
//!         println!("{}", event.as_text_message().text);
//!     }
//!     Ok::<(), std::io::Error>(())
//! })?;
//! ```

// Module order matters due to dependencies
mod json;
pub mod signature;
pub mod attachment;
pub mod referral;
pub mod account_linking;
pub mod events;
pub mod classifier;
pub mod walker;
pub mod config;
pub mod receiver;
pub mod inbound;

pub use account_linking::*;
pub use attachment::*;
pub use classifier::classify;
pub use config::ReceiverConfig;
pub use events::*;
pub use inbound::*;
pub use receiver::*;
pub use referral::*;
pub use signature::*;
pub use walker::*;

use thiserror::Error;

/// Boxed error raised by a caller-supplied event handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Webhook receive errors
#[derive(Error, Debug)]
pub enum ReceiveError {
    /// A signature was supplied and does not match the body
    #[error("Signature verification failed: {0}")]
    SignatureMismatch(String),

    /// The body is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The envelope does not have the expected shape
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The subscription handshake was rejected
    #[error("Webhook verification failed: {0}")]
    VerificationFailed(String),

    /// The event handler returned an error; the walk stopped at that event
    #[error("Event handler failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ::config::ConfigError),
}

impl ReceiveError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ReceiveError::SignatureMismatch(_) => 401,
            ReceiveError::InvalidPayload(_) => 400,
            ReceiveError::SchemaViolation(_) => 400,
            ReceiveError::VerificationFailed(_) => 403,
            ReceiveError::Handler(_) => 500,
            ReceiveError::Configuration(_) => 500,
        }
    }

    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ReceiveError::SignatureMismatch(_) => "SIGNATURE_MISMATCH",
            ReceiveError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ReceiveError::SchemaViolation(_) => "SCHEMA_VIOLATION",
            ReceiveError::VerificationFailed(_) => "VERIFICATION_FAILED",
            ReceiveError::Handler(_) => "HANDLER_FAILED",
            ReceiveError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReceiveError>;
