//! Error types for the prediction client

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the prediction service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or the response could not be read
    #[error("{0}")]
    Transport(String),

    /// Response body did not match the service contract
    #[error("Invalid response body (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
