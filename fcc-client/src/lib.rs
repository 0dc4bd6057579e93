//! FCC Client - stopping-power prediction for proton launches
//!
//! The client turns a [`LaunchTicket`] into a [`PredictionResult`] without
//! ever holding up the frame loop:
//!
//! ```text
//!   SimulationContext::launch ──▶ LaunchTicket
//!                                     │
//!                       PredictionClient::dispatch (tokio task)
//!                                     │  POST {start_pos, vdir, vmag}
//!                                     ▼
//!                            PredictionService
//!                                     │
//!            mpsc ◀── PredictionOutcome { sequence, result }
//!             │
//!   driver drains between frames ──▶ SimulationContext::apply_prediction
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fcc_client::{ClientConfig, PredictionClient};
//!
//! let client = PredictionClient::new(&ClientConfig::from_env()?)?;
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let ticket = ctx.launch()?;
//! client.dispatch(ticket, tx.clone());
//!
//! // ... frames ...
//! while let Ok(outcome) = rx.try_recv() {
//!     ctx.apply_prediction(outcome.sequence, outcome.result);
//! }
//! ```

pub mod service;
pub mod config;
pub mod error;

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{ClientError, ClientResult};
pub use service::{FixedPredictionService, HttpPredictionService, PredictionService};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fcc_core::{LaunchTicket, PredictionRequest, PredictionResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// A prediction tagged with the launch that asked for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// Launch sequence from the ticket
    pub sequence: u64,
    pub result: PredictionResult,
    pub launched_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PredictionOutcome {
    /// Round-trip time in milliseconds
    pub fn latency_ms(&self) -> i64 {
        (self.completed_at - self.launched_at).num_milliseconds()
    }
}

/// Sends prediction requests on behalf of a simulation driver
#[derive(Clone)]
pub struct PredictionClient {
    service: Arc<dyn PredictionService>,
}

impl PredictionClient {
    /// Create a client backed by HTTP
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::with_service(HttpPredictionService::new(config)?))
    }

    /// Create with a custom backend
    pub fn with_service<S: PredictionService + 'static>(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Backend name
    pub fn backend(&self) -> &str {
        self.service.name()
    }

    /// Send one request and interpret the outcome
    ///
    /// Never fails: transport and decode problems become
    /// [`PredictionResult::Transport`].
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        match self.service.predict(request).await {
            Ok(response) => PredictionResult::from_response(response),
            Err(e) => {
                tracing::warn!(backend = self.service.name(), "prediction request failed: {}", e);
                PredictionResult::Transport(e.to_string())
            }
        }
    }

    /// Run the prediction for `ticket` on a background task and send the
    /// outcome to `tx`
    ///
    /// There is no retry and no cancellation; a receiver that has gone away
    /// simply drops the outcome.
    pub fn dispatch(
        &self,
        ticket: LaunchTicket,
        tx: UnboundedSender<PredictionOutcome>,
    ) -> JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            tracing::debug!(sequence = ticket.sequence, request = ?ticket.request, "dispatching prediction");

            let result = client.predict(&ticket.request).await;
            let outcome = PredictionOutcome {
                sequence: ticket.sequence,
                result,
                launched_at: ticket.launched_at,
                completed_at: Utc::now(),
            };

            tracing::info!(
                sequence = outcome.sequence,
                success = outcome.result.is_success(),
                latency_ms = outcome.latency_ms(),
                "prediction complete"
            );

            if tx.send(outcome).is_err() {
                tracing::debug!(sequence = ticket.sequence, "prediction receiver closed");
            }
        })
    }
}
