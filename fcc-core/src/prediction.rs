//! Stopping-power prediction model
//!
//! Request/response types for the remote prediction service, the text shown
//! in the result region, and the guard that keeps a slow response from an
//! old launch from overwriting a newer one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::trajectory::LaunchCommand;

/// Unit label appended to the stopping-power value
pub const STOPPING_POWER_UNIT: &str = "MeV/(mg/cm²)";

/// Caveat shown under every successful prediction
pub const FEATURIZER_DISCLAIMER: &str = "This result uses a legacy featurizer stack that may include \
incomplete or degraded components. Predictions are exploratory and may not reflect physically \
accurate stopping powers.";

/// The service's own statement about which inputs it uses
pub const START_POSITION_NOTE: &str = "Note: Starting position is not used in prediction. \
Only velocity direction and magnitude affect the result.";

/// Shown when a response carries neither a value nor an error
pub const UNRECOGNIZED_RESPONSE: &str = "unrecognized response from prediction service";

/// Body POSTed to the prediction service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Launch position; sent for traceability only
    pub start_pos: [f64; 3],
    /// Direction, normalised if the launch asked for it
    pub vdir: [f64; 3],
    /// Speed scalar
    pub vmag: f64,
}

impl PredictionRequest {
    /// Build the request for a launch
    pub fn from_launch(command: &LaunchCommand) -> SimResult<Self> {
        let direction = command.effective_direction()?;
        Ok(Self {
            start_pos: command.position.to_array(),
            vdir: direction.to_array(),
            vmag: command.speed,
        })
    }
}

/// Body returned by the prediction service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopping_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PredictionResult {
    /// Service returned a value
    StoppingPower(f64),
    /// Service returned an error payload
    Remote(String),
    /// Request never produced a usable response
    Transport(String),
}

impl PredictionResult {
    /// Interpret a decoded response body
    pub fn from_response(response: PredictionResponse) -> Self {
        match response {
            PredictionResponse { stopping_power: Some(value), .. } => Self::StoppingPower(value),
            PredictionResponse { error: Some(message), .. } => Self::Remote(message),
            _ => Self::Remote(UNRECOGNIZED_RESPONSE.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::StoppingPower(_))
    }

    /// Text for the result region
    pub fn render(&self) -> String {
        match self {
            Self::StoppingPower(value) => format!(
                "Estimated Stopping Power: {:.4} {}\n{}\n{}",
                value, STOPPING_POWER_UNIT, FEATURIZER_DISCLAIMER, START_POSITION_NOTE
            ),
            Self::Remote(message) => format!("Error: {}", message),
            Self::Transport(message) => format!("Request failed: {}", message),
        }
    }
}

/// A launch's claim on the result region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchTicket {
    /// Monotonic launch number
    pub sequence: u64,
    pub request: PredictionRequest,
    pub launched_at: DateTime<Utc>,
}

/// The result region
///
/// Every launch and every reset advances the sequence. Only a result tagged
/// with the current sequence may update the text.
#[derive(Debug, Clone, Default)]
pub struct PredictionDisplay {
    sequence: u64,
    result: Option<PredictionResult>,
    updated_at: Option<DateTime<Utc>>,
}

impl PredictionDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the region for a new launch; the current text stays until the
    /// new result arrives
    pub fn begin(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Clear the region and orphan anything still in flight
    pub fn clear(&mut self) {
        self.sequence += 1;
        self.result = None;
        self.updated_at = Some(Utc::now());
    }

    /// Show `result` if it belongs to the latest launch
    ///
    /// Returns whether the display changed.
    pub fn apply(&mut self, sequence: u64, result: PredictionResult) -> bool {
        if sequence != self.sequence {
            tracing::debug!(sequence, latest = self.sequence, "discarding stale prediction");
            return false;
        }
        self.result = Some(result);
        self.updated_at = Some(Utc::now());
        true
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    /// Current text; empty when nothing is shown
    pub fn text(&self) -> String {
        self.result.as_ref().map(PredictionResult::render).unwrap_or_default()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::vector::Vec3;

    fn launch(direction: Vec3, normalize: bool) -> LaunchCommand {
        LaunchCommand { position: Vec3::splat(-4.0), direction, normalize, speed: 0.1 }
    }

    #[test]
    fn test_request_normalized_direction() {
        let req = PredictionRequest::from_launch(&launch(Vec3::new(3.0, 4.0, 0.0), true)).unwrap();
        assert!((req.vdir[0] - 0.6).abs() < 1e-12);
        assert!((req.vdir[1] - 0.8).abs() < 1e-12);
        assert_eq!(req.vdir[2], 0.0);
        assert_eq!(req.vmag, 0.1);
        assert_eq!(req.start_pos, [-4.0, -4.0, -4.0]);
    }

    #[test]
    fn test_request_raw_direction() {
        let req = PredictionRequest::from_launch(&launch(Vec3::new(3.0, 4.0, 0.0), false)).unwrap();
        assert_eq!(req.vdir, [3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_request_zero_direction() {
        let result = PredictionRequest::from_launch(&launch(Vec3::zero(), true));
        assert!(matches!(result, Err(SimError::ZeroVelocity)));
    }

    #[test]
    fn test_request_wire_shape() {
        let req = PredictionRequest { start_pos: [1.0, 2.0, 3.0], vdir: [0.0, 0.0, 1.0], vmag: 0.5 };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "start_pos": [1.0, 2.0, 3.0], "vdir": [0.0, 0.0, 1.0], "vmag": 0.5 })
        );
    }

    #[test]
    fn test_render_stopping_power() {
        let response: PredictionResponse = serde_json::from_str(r#"{"stopping_power": 1.23456}"#).unwrap();
        let result = PredictionResult::from_response(response);
        let text = result.render();

        assert!(result.is_success());
        assert!(text.contains("1.2346"));
        assert!(text.contains(STOPPING_POWER_UNIT));
        assert!(text.contains(FEATURIZER_DISCLAIMER));
        assert!(text.contains(START_POSITION_NOTE));
    }

    #[test]
    fn test_render_remote_error() {
        let response: PredictionResponse = serde_json::from_str(r#"{"error": "x"}"#).unwrap();
        assert_eq!(PredictionResult::from_response(response).render(), "Error: x");
    }

    #[test]
    fn test_render_unrecognized() {
        let response: PredictionResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(
            PredictionResult::from_response(response).render(),
            format!("Error: {}", UNRECOGNIZED_RESPONSE)
        );
    }

    #[test]
    fn test_render_transport() {
        let result = PredictionResult::Transport("connection refused".to_string());
        assert_eq!(result.render(), "Request failed: connection refused");
    }

    #[test]
    fn test_display_discards_stale() {
        let mut display = PredictionDisplay::new();

        let first = display.begin();
        let second = display.begin();

        assert!(!display.apply(first, PredictionResult::StoppingPower(1.0)));
        assert!(display.text().is_empty());

        assert!(display.apply(second, PredictionResult::StoppingPower(2.0)));
        assert!(display.text().contains("2.0000"));
    }

    #[test]
    fn test_display_clear_orphans_in_flight() {
        let mut display = PredictionDisplay::new();
        let seq = display.begin();
        display.clear();

        assert!(!display.apply(seq, PredictionResult::Remote("late".to_string())));
        assert!(display.result().is_none());
        assert_eq!(display.text(), "");
    }

    #[test]
    fn test_display_keeps_text_until_new_result() {
        let mut display = PredictionDisplay::new();
        let seq = display.begin();
        display.apply(seq, PredictionResult::StoppingPower(0.5));

        display.begin();
        assert!(display.text().contains("0.5000"));
    }
}
