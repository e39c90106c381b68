//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional `.env` file.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub delivery: DeliveryConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Per-session limits
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Inbound silence after which the watchdog evicts a session
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Outbound mailbox capacity, in lines
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Longer inbound lines are split into chunks of this size
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    /// How long teardown waits for the write loop to flush
    #[serde(default = "default_writer_grace_ms")]
    pub writer_grace_ms: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn writer_grace(&self) -> Duration {
        Duration::from_millis(self.writer_grace_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            mailbox_capacity: default_mailbox_capacity(),
            max_line_bytes: default_max_line_bytes(),
            writer_grace_ms: default_writer_grace_ms(),
        }
    }
}

/// Mailbox delivery policy
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Bound on a single enqueue attempt
    #[serde(default = "default_delivery_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra timeout windows before a line is dropped
    #[serde(default)]
    pub retries: u32,
}

impl DeliveryConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_delivery_timeout_ms(),
            retries: 0,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_idle_timeout_secs() -> u64 {
    600 // 10 minutes
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_max_line_bytes() -> usize {
    4096
}

fn default_writer_grace_ms() -> u64 {
    1000
}

fn default_delivery_timeout_ms() -> u64 {
    100
}

/// Read an optional variable, parsing it when present
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting values fail validation
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: env::var("CHAT_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("CHAT_PORT")?.unwrap_or_else(default_port),
            },
            session: SessionConfig {
                idle_timeout_secs: parse_var("CHAT_IDLE_TIMEOUT_SECS")?
                    .unwrap_or_else(default_idle_timeout_secs),
                mailbox_capacity: parse_var("CHAT_MAILBOX_CAPACITY")?
                    .unwrap_or_else(default_mailbox_capacity),
                max_line_bytes: parse_var("CHAT_MAX_LINE_BYTES")?
                    .unwrap_or_else(default_max_line_bytes),
                writer_grace_ms: parse_var("CHAT_WRITER_GRACE_MS")?
                    .unwrap_or_else(default_writer_grace_ms),
            },
            delivery: DeliveryConfig {
                timeout_ms: parse_var("CHAT_DELIVERY_TIMEOUT_MS")?
                    .unwrap_or_else(default_delivery_timeout_ms),
                retries: parse_var("CHAT_DELIVERY_RETRIES")?.unwrap_or(0),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the gateway cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.idle_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("CHAT_IDLE_TIMEOUT_SECS", "0".to_string()));
        }
        if self.session.mailbox_capacity == 0 {
            return Err(ConfigError::InvalidValue("CHAT_MAILBOX_CAPACITY", "0".to_string()));
        }
        if self.session.max_line_bytes == 0 {
            return Err(ConfigError::InvalidValue("CHAT_MAX_LINE_BYTES", "0".to_string()));
        }
        if self.delivery.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("CHAT_DELIVERY_TIMEOUT_MS", "0".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            session: SessionConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
