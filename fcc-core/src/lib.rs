//! # FCC-Core
//!
//! Face-centered-cubic lattice construction and straight-line proton
//! trajectories, with the request/response model for a remote
//! stopping-power prediction service.
//!
//! ## Features
//!
//! - **Lattice builder**: `14·n³` atom sites with running bounding box
//! - **Trajectory state machine**: Idle/Active, per-frame or elapsed-time
//!   integration, trail recording, exit-sphere deactivation
//! - **Prediction model**: request construction, response interpretation,
//!   stale-result guard keyed on launch sequence
//! - **Simulation context**: one owner for all mutable simulation state
//!
//! ## Example
//!
//! ```rust
//! use fcc_core::{SimulationConfig, SimulationContext, SimState, Vec3};
//!
//! let mut ctx = SimulationContext::new(SimulationConfig::default()).unwrap();
//! ctx.set_velocity(Vec3::new(0.0, 0.0, 1.0));
//! ctx.set_speed(0.1);
//!
//! let ticket = ctx.launch().unwrap();
//! assert_eq!(ticket.request.vdir, [0.0, 0.0, 1.0]);
//!
//! while ctx.simulator().state() == SimState::Active {
//!     ctx.frame();
//! }
//! assert!(ctx.simulator().trail().len() > 0);
//! ```

pub mod vector;
pub mod lattice;
pub mod scene;
pub mod trajectory;
pub mod input;
pub mod prediction;
pub mod context;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use vector::Vec3;
pub use lattice::{BoundingBox, Lattice, LatticePoint, SiteKind, FCC_BASIS, SITES_PER_CELL};
pub use scene::{OrbitCamera, OutlineBox, SceneLayout};
pub use trajectory::{LaunchCommand, Proton, SimState, Simulator, TickOutcome, Trail};
pub use input::FormInputs;
pub use prediction::{
    LaunchTicket, PredictionDisplay, PredictionRequest, PredictionResponse, PredictionResult,
};
pub use context::{SimulationContext, Snapshot};
pub use config::{
    IntegrationMode, LatticeConfig, SceneConfig, SimulationConfig, SliderConfig, MAX_LATTICE_POINTS,
};
pub use error::{SimError, SimResult};
