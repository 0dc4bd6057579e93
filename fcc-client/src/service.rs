//! Prediction service backends

use async_trait::async_trait;

use fcc_core::{PredictionRequest, PredictionResponse};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prediction service interface
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Send one request and decode the response body
    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse>;
}

/// HTTP backend: `POST` with a JSON body
pub struct HttpPredictionService {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpPredictionService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(std::time::Duration::from_millis(ms));
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    fn name(&self) -> &str {
        "http"
    }

    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        // The body is interpreted whatever the status: error payloads often
        // arrive with a 4xx/5xx
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(status, bytes = body.len(), "prediction response received");

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            status,
            message: e.to_string(),
        })
    }
}

/// Backend that answers every request with the same body, without any I/O
pub struct FixedPredictionService {
    response: PredictionResponse,
}

impl FixedPredictionService {
    pub fn new(response: PredictionResponse) -> Self {
        Self { response }
    }

    /// Always report `value`
    pub fn stopping_power(value: f64) -> Self {
        Self::new(PredictionResponse { stopping_power: Some(value), error: None })
    }

    /// Always report an error payload
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(PredictionResponse { stopping_power: None, error: Some(message.into()) })
    }
}

#[async_trait]
impl PredictionService for FixedPredictionService {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn predict(&self, _request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        Ok(self.response.clone())
    }
}
