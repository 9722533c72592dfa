//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "messenger-server",
    about = "Messenger platform webhook server",
    version,
    long_about = "Receives Messenger platform webhook deliveries, verifies their \
                  signatures and logs every classified messaging event."
)]
pub struct Args {
    /// Path to configuration file (extension optional)
    #[arg(
        short,
        long,
        env = "CONFIG_PATH",
        default_value = "config/messenger"
    )]
    pub config: PathBuf,

    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Enable JSON log format (useful for production)
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    /// Config path as the string the config loader expects
    pub fn config_path(&self) -> anyhow::Result<&str> {
        self.config
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Config path is not valid UTF-8: {:?}", self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["messenger-server"]);

        assert_eq!(args.port, 8080);
        assert_eq!(args.log_level, "info");
        assert_eq!(args.config_path().unwrap(), "config/messenger");
        assert!(!args.json_logs);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let result = Args::try_parse_from(["messenger-server", "--log-level", "loud"]);
        assert!(result.is_err());
    }
}
