//! Configuration for the prediction client

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Prediction endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://stoppingpowersimulationbackended-1.onrender.com/predict";

/// Environment variable overriding the endpoint
pub const ENDPOINT_ENV: &str = "FCC_PREDICT_URL";

/// Environment variable setting a request timeout in milliseconds
pub const TIMEOUT_ENV: &str = "FCC_PREDICT_TIMEOUT_MS";

/// Prediction client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL the request is POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout; `None` leaves the transport default in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_user_agent() -> String { format!("fcc-client/{}", env!("CARGO_PKG_VERSION")) }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Defaults overlaid with `FCC_PREDICT_URL` and `FCC_PREDICT_TIMEOUT_MS`
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let ms = raw
                .parse()
                .map_err(|_| ClientError::Config(format!("{} must be an integer, got {:?}", TIMEOUT_ENV, raw)))?;
            config.timeout_ms = Some(ms);
        }

        Ok(config)
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the endpoint URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a request timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.unwrap_or_else(default_endpoint),
            timeout_ms: self.timeout_ms,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::builder().build();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.timeout_ms.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .endpoint("http://localhost:9000/predict")
            .timeout_ms(2500)
            .build();
        assert_eq!(config.endpoint, "http://localhost:9000/predict");
        assert_eq!(config.timeout_ms, Some(2500));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_ms": 100}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_ms, Some(100));
    }
}
