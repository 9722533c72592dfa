//! Receiver entry points
//!
//! [`MessengerReceiver`] ties the pipeline together for one delivery:
//! signature check, envelope parse, walk, classification, handler. It holds
//! only the app credentials and is safe to share across concurrent requests.

use crate::{
    config::ReceiverConfig,
    events::Event,
    signature::verify_signature,
    walker::{parse_envelope, walk_envelope},
    HandlerError, ReceiveError, Result,
};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// `hub.mode` value sent by the platform when subscribing a webhook
pub const HUB_MODE_SUBSCRIBE: &str = "subscribe";

/// Verifies and classifies webhook deliveries for one app
#[derive(Debug, Clone)]
pub struct MessengerReceiver {
    config: ReceiverConfig,
}

impl MessengerReceiver {
    pub fn new(app_secret: &str, verify_token: &str) -> Self {
        Self::from_config(ReceiverConfig::new(app_secret, verify_token))
    }

    pub fn from_config(config: ReceiverConfig) -> Self {
        Self { config }
    }

    /// Processes one delivery.
    ///
    /// * `body` - The raw request body, exactly as received
    /// * `signature` - The signature header value, if the request carried one
    /// * `handler` - Called once per messaging event, in document order
    ///
    /// With no signature the check is skipped and a warning is logged. A
    /// signature that does not match fails before the body is parsed.
    pub fn on_receive_events<F, E>(
        &self,
        body: &[u8],
        signature: Option<&str>,
        handler: F,
    ) -> Result<()>
    where
        F: FnMut(Event) -> std::result::Result<(), E>,
        E: Into<HandlerError>,
    {
        match signature {
            Some(signature) => {
                if !verify_signature(body, signature, self.config.app_secret.as_bytes()) {
                    warn!("Webhook signature verification failed");
                    return Err(ReceiveError::SignatureMismatch(
                        "Provided signature does not match calculated signature".to_string(),
                    ));
                }
            }
            None => {
                warn!(
                    "No signature provided, hence the signature verification is skipped. \
                     THIS IS NOT RECOMMENDED"
                );
            }
        }

        let document = parse_envelope(body)?;
        walk_envelope(&document, handler)
    }

    /// Answers the subscription handshake.
    ///
    /// Succeeds only when `mode` is `subscribe` and `verify_token` equals the
    /// configured token.
    pub fn verify_webhook(&self, mode: &str, verify_token: &str) -> Result<()> {
        if mode != HUB_MODE_SUBSCRIBE {
            warn!(mode = %mode, "Webhook verification rejected: unexpected mode");
            return Err(ReceiveError::VerificationFailed(format!(
                "Webhook verification failed. Mode '{}' is invalid",
                mode
            )));
        }

        let matches: bool = verify_token
            .as_bytes()
            .ct_eq(self.config.verify_token.as_bytes())
            .into();
        if !matches {
            warn!("Webhook verification rejected: verify token mismatch");
            return Err(ReceiveError::VerificationFailed(
                "Webhook verification failed. Verify token is invalid".to_string(),
            ));
        }

        info!("Webhook subscription verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{compute_signature, format_signature_header, SignatureAlgorithm};

    const BODY: &[u8] = br#"{"object":"page","entry":[{"id":"PAGE_ID","time":1,"messaging":[{"sender":{"id":"U"},"recipient":{"id":"P"},"timestamp":1,"message":{"mid":"m","text":"hi"}}]}]}"#;

    fn receiver() -> MessengerReceiver {
        MessengerReceiver::new("app-secret", "CUSTOM_VERIFY_TOKEN")
    }

    fn count(receiver: &MessengerReceiver, body: &[u8], signature: Option<&str>) -> Result<usize> {
        let mut n = 0;
        receiver.on_receive_events(body, signature, |_| {
            n += 1;
            Ok::<(), HandlerError>(())
        })?;
        Ok(n)
    }

    #[test]
    fn test_verify_webhook() {
        assert!(receiver().verify_webhook("subscribe", "CUSTOM_VERIFY_TOKEN").is_ok());
    }

    #[test]
    fn test_verify_webhook_invalid_mode() {
        let result = receiver().verify_webhook("INVALID_MODE", "CUSTOM_VERIFY_TOKEN");
        assert!(matches!(result, Err(ReceiveError::VerificationFailed(_))));
    }

    #[test]
    fn test_verify_webhook_invalid_token() {
        let result = receiver().verify_webhook("subscribe", "INVALID_VERIFY_TOKEN");
        assert!(matches!(result, Err(ReceiveError::VerificationFailed(_))));
    }

    #[test]
    fn test_verify_webhook_token_prefix_rejected() {
        let receiver = receiver();

        assert!(receiver.verify_webhook("subscribe", "CUSTOM_VERIFY").is_err());
        assert!(receiver.verify_webhook("subscribe", "CUSTOM_VERIFY_TOKEN_").is_err());
        assert!(receiver.verify_webhook("subscribe", "").is_err());
    }

    #[test]
    fn test_unsigned_delivery_is_processed() {
        assert_eq!(count(&receiver(), BODY, None).unwrap(), 1);
    }

    #[test]
    fn test_signed_delivery_is_processed() {
        let sig = compute_signature(SignatureAlgorithm::HmacSha256, BODY, b"app-secret");
        let header = format_signature_header(SignatureAlgorithm::HmacSha256, &sig);

        assert_eq!(count(&receiver(), BODY, Some(&header)).unwrap(), 1);
    }

    #[test]
    fn test_bad_signature_fails_before_parsing() {
        // Not JSON at all: a parse attempt would report InvalidPayload
        let result = count(&receiver(), b"{{{ definitely not json", Some("sha1=00"));
        assert!(matches!(result, Err(ReceiveError::SignatureMismatch(_))));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let sig = compute_signature(SignatureAlgorithm::HmacSha1, BODY, b"other-secret");
        let header = format_signature_header(SignatureAlgorithm::HmacSha1, &sig);

        let result = count(&receiver(), BODY, Some(&header));
        assert!(matches!(result, Err(ReceiveError::SignatureMismatch(_))));
    }
}
