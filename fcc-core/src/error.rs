//! Error types for the simulator core

use thiserror::Error;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur in the simulator core
#[derive(Error, Debug)]
pub enum SimError {
    /// Launch vector has zero magnitude
    #[error("Trajectory vector is zero; cannot launch")]
    ZeroVelocity,

    /// Launch vector has a non-finite component
    #[error("Invalid trajectory vector: [{0}, {1}, {2}]")]
    InvalidVector(f64, f64, f64),

    /// Speed scalar is not a finite number
    #[error("Invalid speed: {0}")]
    InvalidSpeed(f64),

    /// Lattice parameters are out of range
    #[error("Invalid lattice configuration: {0}")]
    InvalidLattice(String),

    /// Slider or integration settings are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
