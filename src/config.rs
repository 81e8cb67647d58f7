//! Configuration module for loading and parsing TOML configuration files.
//!
//! Values are read once at startup: an optional TOML file provides the base
//! configuration and a small set of environment variables override it.

use fmp_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Upstream provider configuration.
    pub upstream: UpstreamConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Cross-origin configuration.
    pub cors: CorsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Upstream (FMP) configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the stable API.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "demo".to_string(),
            timeout_secs: 30,
        }
    }
}

impl UpstreamConfig {
    /// Builds the client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    PlainText,
    /// One JSON object per line.
    Structured,
}

impl LogFormat {
    /// Parses the `LOG_FORMAT` environment value.
    #[must_use]
    pub fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "plain" | "plain_text" | "text" => Some(Self::PlainText),
            "json" | "structured" => Some(Self::Structured),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Default `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::PlainText,
            level: "info,tower_http=debug".to_string(),
        }
    }
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the startup configuration: the file named by `CONFIG_PATH` (or
    /// defaults), then environment overrides.
    ///
    /// # Errors
    /// Returns error if the file or any override is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a key lookup (normally the process environment).
    ///
    /// Recognized keys: `FMP_API_KEY`, `FMP_BASE_URL`, `HOST`, `PORT`,
    /// `LOG_FORMAT`, `LOG_LEVEL`.
    ///
    /// # Errors
    /// Returns error if `PORT` or `LOG_FORMAT` cannot be parsed.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("FMP_API_KEY") {
            self.upstream.api_key = key;
        }
        if let Some(url) = lookup("FMP_BASE_URL") {
            self.upstream.base_url = url;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT must be a number: {}", port)))?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = LogFormat::from_env_value(&format).ok_or_else(|| {
                ConfigError::InvalidValue(format!("unknown LOG_FORMAT: {}", format))
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(self)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "upstream base_url cannot be empty".to_string(),
            ));
        }
        if self.upstream.api_key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "upstream api_key cannot be empty".to_string(),
            ));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "upstream timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 3000

[upstream]
base_url = "http://localhost:9999/stable"
api_key = "abc123456"
timeout_secs = 10

[logging]
format = "structured"
level = "debug"

[cors]
allowed_origins = ["http://example.com"]
"#;

        let config = Config::parse(toml_content).expect("should parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.base_url, "http://localhost:9999/stable");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.logging.format, LogFormat::Structured);
        assert_eq!(config.cors.allowed_origins, vec!["http://example.com"]);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = Config::parse("").expect("should parse");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.api_key, "demo");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::PlainText);
        assert_eq!(config.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_client_config_timeout() {
        let config = UpstreamConfig::default();

        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FMP_API_KEY", "live-key-9876"),
            ("FMP_BASE_URL", "http://mock/stable"),
            ("PORT", "9100"),
            ("LOG_FORMAT", "json"),
        ]);

        let config = Config::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.upstream.api_key, "live-key-9876");
        assert_eq!(config.upstream.base_url, "http://mock/stable");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Structured);
    }

    #[test]
    fn test_invalid_port_override() {
        let result = Config::default().with_overrides(|k| {
            if k == "PORT" {
                Some("eighty".to_string())
            } else {
                None
            }
        });

        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value("JSON"), Some(LogFormat::Structured));
        assert_eq!(LogFormat::from_env_value("plain"), Some(LogFormat::PlainText));
        assert_eq!(LogFormat::from_env_value("xml"), None);
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_api_key() {
        let result = Config::parse(
            r#"
[upstream]
api_key = ""
"#,
        );
        assert!(result.is_err());
    }
}
