//! Service configuration module.
//!
//! Handles loading configuration from environment variables with sensible
//! defaults. Telemetry endpoints and credentials come from the same
//! variables the deployment environment provides:
//!
//! - `HOST` / `PORT`: bind address (default "0.0.0.0:8080")
//! - `OTEL_LOGS_URL`: log export endpoint (logs disabled when unset)
//! - `OTEL_TRACE_URL`: trace export endpoint (traces disabled when unset)
//! - `OTEL_BASIC_AUTH_USERNAME` / `OTEL_BASIC_AUTH_PASSWORD`: collector
//!   credentials, required when an endpoint is configured
//! - `STAGE`: deployment environment name (default "development")
//! - `DEBUG`: when "true", exports DEBUG-level records and verbose logs

use anyhow::{bail, Result};
use std::net::SocketAddr;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Log export endpoint; logs are disabled when `None`.
    pub logs_url: Option<String>,
    /// Trace export endpoint; traces are disabled when `None`.
    pub traces_url: Option<String>,
    /// Basic-auth username for the collector.
    pub auth_username: Option<String>,
    /// Basic-auth password for the collector.
    pub auth_password: Option<String>,
    /// Deployment environment name.
    pub stage: String,
    /// Whether debug-level telemetry is enabled.
    pub debug: bool,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `PORT` is set but cannot be parsed as a valid port number
    /// - an export endpoint is configured without both credentials
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(8080);

        let config = Self {
            host,
            port,
            logs_url: std::env::var("OTEL_LOGS_URL").ok(),
            traces_url: std::env::var("OTEL_TRACE_URL").ok(),
            auth_username: std::env::var("OTEL_BASIC_AUTH_USERNAME").ok(),
            auth_password: std::env::var("OTEL_BASIC_AUTH_PASSWORD").ok(),
            stage: std::env::var("STAGE").unwrap_or_else(|_| "development".to_string()),
            debug: std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Telemetry is a declared requirement wherever an endpoint is
    /// configured, so missing credentials fail startup instead of silently
    /// disabling a signal.
    ///
    /// # Errors
    ///
    /// Returns an error if an export endpoint is configured without both
    /// basic-auth credentials.
    pub fn validate(&self) -> Result<()> {
        if (self.logs_url.is_some() || self.traces_url.is_some())
            && (self.auth_username.is_none() || self.auth_password.is_none())
        {
            bail!(
                "OTEL_BASIC_AUTH_USERNAME and OTEL_BASIC_AUTH_PASSWORD are required \
                 when an export endpoint is configured"
            );
        }
        Ok(())
    }

    /// Whether any telemetry signal is configured for export.
    #[must_use]
    pub fn telemetry_enabled(&self) -> bool {
        self.logs_url.is_some() || self.traces_url.is_some()
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid
    /// socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            logs_url: None,
            traces_url: None,
            auth_username: None,
            auth_password: None,
            stage: "development".to_string(),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.telemetry_enabled());
        assert_eq!(config.socket_addr().port(), 8080);
    }

    #[test]
    fn test_endpoint_without_credentials_is_rejected() {
        let config = Config {
            logs_url: Some("http://collector/otel/v1/logs".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_with_credentials_is_accepted() {
        let config = Config {
            logs_url: Some("http://collector/otel/v1/logs".to_string()),
            traces_url: Some("http://collector/otel/v1/traces".to_string()),
            auth_username: Some("user".to_string()),
            auth_password: Some("pass".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.telemetry_enabled());
    }
}
