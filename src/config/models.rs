// src/config/models.rs
use serde::Deserialize;
use std::net::SocketAddr;
use url::Url;

/// Default configuration values
pub mod defaults {
    pub const ORIGIN: &str = "http://127.0.0.1:8000";
    pub const LISTEN: &str = "127.0.0.1:8000";
    pub const MESSAGE: &str = "Hello from the API";
    pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
    pub const METRICS_PORT: u16 = 9100;
    pub const METRICS_PATH: &str = "/metrics";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("client origin '{0}' must be an http(s) URL with a host")]
    InvalidOrigin(String),

    #[error("server prefix '{0}' must be empty or start with '/' and not end with '/'")]
    InvalidPrefix(String),

    #[error("metrics path '{0}' must start with '/'")]
    InvalidMetricsPath(String),

    #[error("metrics port must be non-zero when metrics are enabled")]
    InvalidMetricsPort,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()?;
        self.server.validate()?;
        self.metrics.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin the `/api` base path is resolved against.
    pub origin: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(defaults::ORIGIN).expect("default origin is a valid URL"),
        }
    }
}

impl ClientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = matches!(self.origin.scheme(), "http" | "https");
        if !scheme_ok || self.origin.host_str().is_none() {
            return Err(ConfigError::InvalidOrigin(self.origin.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Mount point for the routes, e.g. `/api`. Empty serves them at `/`.
    pub prefix: String,
    /// Body of the root endpoint's `message` field.
    pub message: String,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: defaults::LISTEN.parse().expect("default listen address is valid"),
            prefix: String::new(),
            message: defaults::MESSAGE.to_string(),
            allowed_origins: vec![defaults::ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.prefix.is_empty() && (!self.prefix.starts_with('/') || self.prefix.ends_with('/'))
        {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: defaults::METRICS_PORT,
            path: defaults::METRICS_PATH.to_string(),
        }
    }
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(self.path.clone()));
        }
        if self.enabled && self.port == 0 {
            return Err(ConfigError::InvalidMetricsPort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_origin() {
        let mut config = Config::default();
        config.client.origin = Url::parse("ftp://files.example.com").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn test_prefix_rules() {
        let mut config = Config::default();
        for ok in ["", "/api", "/v1/api"] {
            config.server.prefix = ok.to_string();
            assert!(config.validate().is_ok(), "{ok} should be accepted");
        }
        for bad in ["api", "/api/", "/"] {
            config.server.prefix = bad.to_string();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidPrefix(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_metrics_port_only_checked_when_enabled() {
        let mut config = Config::default();
        config.metrics.port = 0;
        assert!(config.validate().is_ok());

        config.metrics.enabled = true;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMetricsPort)));
    }
}
