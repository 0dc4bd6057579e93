//! Simulation context
//!
//! One owner for everything the control panel, the frame loop and the
//! result region touch. Each operation borrows the context explicitly, so a
//! driver (the CLI, a test, a renderer) decides when frames run and when
//! prediction results are applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{IntegrationMode, SimulationConfig};
use crate::error::SimResult;
use crate::input::FormInputs;
use crate::lattice::Lattice;
use crate::prediction::{LaunchTicket, PredictionDisplay, PredictionRequest, PredictionResult};
use crate::scene::SceneLayout;
use crate::trajectory::{LaunchCommand, SimState, Simulator, TickOutcome};
use crate::vector::Vec3;

/// Lattice, scene, simulator, inputs and result region together
#[derive(Debug, Clone)]
pub struct SimulationContext {
    config: SimulationConfig,
    lattice: Lattice,
    scene: SceneLayout,
    simulator: Simulator,
    inputs: FormInputs,
    display: PredictionDisplay,
}

impl SimulationContext {
    /// Build the lattice and park the proton on its corner
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let lattice = Lattice::build(config.lattice.clone())?;
        let mut scene = SceneLayout::new(&lattice, &config.scene);
        let simulator = Simulator::new(lattice.corner(), lattice.center(), lattice.exit_radius());
        let inputs = FormInputs::new(lattice.corner(), &config.speed, &config.zoom);

        scene.set_zoom(inputs.zoom);

        tracing::info!(
            atoms = lattice.len(),
            corner = ?lattice.corner(),
            exit_radius = lattice.exit_radius(),
            "simulation context ready"
        );

        Ok(Self {
            config,
            lattice,
            scene,
            simulator,
            inputs,
            display: PredictionDisplay::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn scene(&self) -> &SceneLayout {
        &self.scene
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn inputs(&self) -> &FormInputs {
        &self.inputs
    }

    pub fn display(&self) -> &PredictionDisplay {
        &self.display
    }

    /// Replace the position field text and move the proton if it parses
    ///
    /// Returns whether the proton moved.
    pub fn set_position_fields(&mut self, fields: [String; 3]) -> bool {
        self.inputs.position = fields;
        self.sync_position()
    }

    /// Move the proton to whatever the position fields hold; non-numeric
    /// text leaves it where it is
    pub fn sync_position(&mut self) -> bool {
        match self.inputs.parse_position() {
            Some(p) => {
                self.simulator.set_position(p);
                true
            }
            None => false,
        }
    }

    pub fn set_velocity_fields(&mut self, fields: [String; 3]) {
        self.inputs.velocity = fields;
    }

    pub fn set_velocity(&mut self, v: Vec3) {
        self.inputs.set_velocity(v);
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.inputs.normalize = normalize;
    }

    /// Move the speed slider; returns the value it settled on
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.inputs.speed = self.config.speed.clamp(speed);
        self.inputs.speed
    }

    /// Move the zoom slider and re-place the camera; returns the value it
    /// settled on
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.inputs.zoom = self.config.zoom.clamp(zoom);
        self.scene.set_zoom(self.inputs.zoom);
        self.inputs.zoom
    }

    /// Launch the proton from the current inputs
    ///
    /// On success the simulator is active and the returned ticket carries
    /// the prediction request to send. On failure nothing changes.
    pub fn launch(&mut self) -> SimResult<LaunchTicket> {
        let command = LaunchCommand {
            position: self.inputs.parse_position().unwrap_or_else(|| self.simulator.position()),
            direction: self.inputs.parse_velocity(),
            normalize: self.inputs.normalize,
            speed: self.inputs.speed,
        };

        self.simulator.launch(&command)?;
        let request = PredictionRequest::from_launch(&command)?;

        let ticket = LaunchTicket {
            sequence: self.display.begin(),
            request,
            launched_at: chrono::Utc::now(),
        };

        tracing::info!(sequence = ticket.sequence, velocity = ?self.simulator.velocity(), "launch");
        Ok(ticket)
    }

    /// Run one frame with the fixed per-frame step
    pub fn frame(&mut self) -> TickOutcome {
        self.simulator.tick()
    }

    /// Run one frame that took `elapsed` of wall time
    pub fn frame_elapsed(&mut self, elapsed: Duration) -> TickOutcome {
        match self.config.integration {
            IntegrationMode::PerFrame => self.simulator.tick(),
            IntegrationMode::Elapsed { reference_hz } => {
                self.simulator.advance(elapsed.as_secs_f64() * reference_hz)
            }
        }
    }

    /// Park the proton, restore default inputs and clear the result region
    pub fn reset(&mut self) {
        self.simulator.reset();
        self.inputs.set_position(self.lattice.corner());
        self.inputs.reset_velocity();
        self.display.clear();
        tracing::info!("reset");
    }

    /// Show a prediction result if it belongs to the latest launch
    pub fn apply_prediction(&mut self, sequence: u64, result: PredictionResult) -> bool {
        self.display.apply(sequence, result)
    }

    /// Serializable view of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.simulator.state(),
            position: self.simulator.position(),
            velocity: self.simulator.velocity(),
            ticks: self.simulator.ticks(),
            trail_length: self.simulator.trail().len(),
            path_length: self.simulator.trail().path_length(),
            distance_from_center: self.simulator.position().distance(&self.lattice.center()),
            prediction: self.display.result().cloned(),
            prediction_text: self.display.text(),
        }
    }
}

/// Point-in-time summary of a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SimState,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ticks: u64,
    pub trail_length: usize,
    pub path_length: f64,
    pub distance_from_center: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
    pub prediction_text: String,
}
