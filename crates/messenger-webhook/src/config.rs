use crate::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;

/// Credentials shared with the Messenger platform app
#[derive(Clone, Deserialize)]
pub struct ReceiverConfig {
    /// App secret used to key the body signature
    pub app_secret: String,
    /// Token echoed by the platform during the subscription handshake
    pub verify_token: String,
}

impl ReceiverConfig {
    pub fn new(app_secret: &str, verify_token: &str) -> Self {
        Self {
            app_secret: app_secret.to_string(),
            verify_token: verify_token.to_string(),
        }
    }

    /// Load configuration from environment variables
    /// (`MESSENGER__APP_SECRET`, `MESSENGER__VERIFY_TOKEN`)
    pub fn load() -> Result<Self> {
        Self::load_from_env("MESSENGER")
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("MESSENGER").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

impl fmt::Debug for ReceiverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverConfig")
            .field("app_secret", &"<redacted>")
            .field("verify_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_receiver_config_creation() {
        let config = ReceiverConfig::new("secret", "token");

        assert_eq!(config.app_secret, "secret");
        assert_eq!(config.verify_token, "token");
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ReceiverConfig::new("very-secret", "very-token");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("very-token"));
    }

    #[test]
    fn test_deserialize_from_toml_source() {
        let config: ReceiverConfig = Config::builder()
            .add_source(File::from_str(
                "app_secret = \"abc\"\nverify_token = \"xyz\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.app_secret, "abc");
        assert_eq!(config.verify_token, "xyz");
    }

    #[test]
    fn test_loader_reports_configuration_error() {
        let err = ReceiverConfig::load_from_env("MESSENGER_WEBHOOK_UNSET_PREFIX").unwrap_err();

        assert!(matches!(err, crate::ReceiveError::Configuration(_)));
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_missing_fields_error() {
        let result: std::result::Result<ReceiverConfig, _> = Config::builder()
            .add_source(File::from_str("app_secret = \"abc\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
