//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (optionally via a `.env` file) on top of defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Issue tracker connection settings.
    pub tracker: TrackerConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Upper bound for `MCP_YOUTRACK_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Issue tracker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the YouTrack instance, e.g. `https://example.youtrack.cloud`.
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Retries for transient failures (connect errors, timeouts, 429, 5xx).
    pub max_retries: u32,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Permanent token used as a bearer token against the tracker.
    pub youtrack_token: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "youtrack_token",
                &self.youtrack_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "youtrack-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            tracker: TrackerConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_YOUTRACK_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = timestamps.parse().unwrap_or(true);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(url) = std::env::var("MCP_YOUTRACK_URL") {
            info!("Tracker URL: {}", url);
            config.tracker.base_url = Some(url);
        } else {
            warn!("MCP_YOUTRACK_URL not set - the server cannot reach a tracker");
        }

        if let Some(secs) = std::env::var("MCP_YOUTRACK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.tracker.request_timeout_secs = secs;
        }

        if let Some(retries) = std::env::var("MCP_YOUTRACK_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            if retries > MAX_RETRIES_LIMIT {
                warn!(
                    "MCP_YOUTRACK_MAX_RETRIES={} is too high, using {}",
                    retries, MAX_RETRIES_LIMIT
                );
            }
            config.tracker.max_retries = retries.min(MAX_RETRIES_LIMIT);
        }

        if let Ok(token) = std::env::var("MCP_YOUTRACK_TOKEN") {
            config.credentials.youtrack_token = Some(token);
            info!("YouTrack token loaded from environment");
        } else {
            warn!("MCP_YOUTRACK_TOKEN not set - requests will be sent without authentication");
        }

        config
    }
}
