//! Application state and initialization

use anyhow::{Context, Result};
use messenger_webhook::{
    Event, EventHandler, HandlerError, MessengerReceiver, ReceiverConfig, WebhookState,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::Args;
use crate::server::Server;

/// Logs every classified event
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn handle(&self, event: Event) -> Result<(), HandlerError> {
        info!(
            kind = %event.kind(),
            sender_id = %event.sender_id(),
            recipient_id = %event.recipient_id(),
            timestamp = %event.timestamp(),
            "Received messaging event"
        );

        match &event {
            Event::TextMessage(message) => debug!(text = %message.text, "Text message"),
            Event::QuickReplyMessage(reply) => debug!(payload = %reply.payload, "Quick reply"),
            Event::Postback(postback) => debug!(title = %postback.title, "Postback"),
            Event::Unsupported(_) => debug!("Event shape not recognized"),
            _ => {}
        }

        Ok(())
    }
}

/// Main application
pub struct App {
    args: Args,
    state: Arc<WebhookState>,
}

impl App {
    /// Build the application with all dependencies
    pub fn build(args: Args) -> Result<Self> {
        let config = ReceiverConfig::load_from_file(args.config_path()?)
            .context("Failed to load receiver configuration")?;
        info!(config = ?config, "Loaded receiver configuration");

        let receiver = MessengerReceiver::from_config(config);
        let state = Arc::new(WebhookState::new(receiver, Arc::new(LoggingEventHandler)));

        Ok(Self { args, state })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        info!("Starting server");
        info!("HTTP port: {}", self.args.port);

        let server = Server::new(self.args, self.state);
        server.run().await
    }
}
