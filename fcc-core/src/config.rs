//! Configuration for the simulator

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::lattice::SITES_PER_CELL;
use crate::vector::Vec3;

/// Largest number of atoms a lattice may hold
pub const MAX_LATTICE_POINTS: usize = 16_000_000;

/// Main simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lattice geometry
    #[serde(default)]
    pub lattice: LatticeConfig,

    /// Camera and helper placement
    #[serde(default)]
    pub scene: SceneConfig,

    /// Speed slider (per-tick displacement scale)
    #[serde(default = "default_speed_slider")]
    pub speed: SliderConfig,

    /// Zoom slider (camera distance multiplier)
    #[serde(default = "default_zoom_slider")]
    pub zoom: SliderConfig,

    /// How a frame advances the proton
    #[serde(default)]
    pub integration: IntegrationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lattice: LatticeConfig::default(),
            scene: SceneConfig::default(),
            speed: default_speed_slider(),
            zoom: default_zoom_slider(),
            integration: IntegrationMode::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> SimResult<()> {
        self.lattice.validate()?;
        self.speed.validate("speed")?;
        self.zoom.validate("zoom")?;
        self.integration.validate()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// FCC lattice geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Edge length of one cubic unit cell
    #[serde(default = "default_unit_cell_size")]
    pub unit_cell_size: f64,

    /// Number of unit cells along each axis
    #[serde(default = "default_lattice_size")]
    pub lattice_size: usize,

    /// Rendered atom radius; pads the outline box
    #[serde(default = "default_atom_radius")]
    pub atom_radius: f64,

    /// Rendered proton radius
    #[serde(default = "default_proton_radius")]
    pub proton_radius: f64,
}

fn default_unit_cell_size() -> f64 { 2.0 }
fn default_lattice_size() -> usize { 5 }
fn default_atom_radius() -> f64 { 0.3 }
fn default_proton_radius() -> f64 { 0.2 }

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            unit_cell_size: 2.0,
            lattice_size: 5,
            atom_radius: 0.3,
            proton_radius: 0.2,
        }
    }
}

impl LatticeConfig {
    /// Create a lattice configuration with default radii
    pub fn new(unit_cell_size: f64, lattice_size: usize) -> Self {
        Self {
            unit_cell_size,
            lattice_size,
            ..Self::default()
        }
    }

    /// Check the geometry is buildable
    pub fn validate(&self) -> SimResult<()> {
        if !self.unit_cell_size.is_finite() || self.unit_cell_size <= 0.0 {
            return Err(SimError::InvalidLattice(format!(
                "unit cell size must be positive, got {}",
                self.unit_cell_size
            )));
        }
        if !self.atom_radius.is_finite() || self.atom_radius < 0.0 {
            return Err(SimError::InvalidLattice(format!(
                "atom radius must be non-negative, got {}",
                self.atom_radius
            )));
        }
        match self.point_count() {
            Some(count) if count <= MAX_LATTICE_POINTS => Ok(()),
            _ => Err(SimError::InvalidLattice(format!(
                "lattice size {} exceeds {} atoms",
                self.lattice_size, MAX_LATTICE_POINTS
            ))),
        }
    }

    /// Atoms in the built lattice, `14·n³`; `None` on overflow
    pub fn point_count(&self) -> Option<usize> {
        let n = self.lattice_size;
        n.checked_mul(n)?.checked_mul(n)?.checked_mul(SITES_PER_CELL)
    }

    /// Full edge length of the lattice, `n * u`
    pub fn span(&self) -> f64 {
        self.lattice_size as f64 * self.unit_cell_size
    }

    /// Distance from the lattice centre past which a proton deactivates
    pub fn exit_radius(&self) -> f64 {
        2.0 * self.span()
    }
}

/// Camera and helper placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Initial camera position
    #[serde(default = "default_camera_position")]
    pub camera_position: Vec3,

    /// Camera distance from the lattice centre at zoom 1.0
    #[serde(default = "default_camera_distance")]
    pub base_camera_distance: f64,

    /// Length of the axes helper drawn at the lattice corner
    #[serde(default = "default_axes_length")]
    pub axes_length: f64,

    /// Radius of the origin marker sphere
    #[serde(default = "default_marker_radius")]
    pub origin_marker_radius: f64,
}

fn default_camera_position() -> Vec3 { Vec3::splat(15.0) }
fn default_camera_distance() -> f64 { 15.0 }
fn default_axes_length() -> f64 { 5.0 }
fn default_marker_radius() -> f64 { 0.25 }

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_position: default_camera_position(),
            base_camera_distance: 15.0,
            axes_length: 5.0,
            origin_marker_radius: 0.25,
        }
    }
}

/// A range slider with a bounded value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderConfig {
    /// Check the range is usable; `name` labels the error
    pub fn validate(&self, name: &str) -> SimResult<()> {
        let Self { min, max, step, default } = *self;
        if !(min.is_finite() && max.is_finite() && step.is_finite() && default.is_finite()) {
            return Err(SimError::InvalidConfig(format!("{} slider values must be finite", name)));
        }
        if min > max {
            return Err(SimError::InvalidConfig(format!(
                "{} slider min {} is above max {}",
                name, min, max
            )));
        }
        if step <= 0.0 {
            return Err(SimError::InvalidConfig(format!("{} slider step must be positive", name)));
        }
        if default < min || default > max {
            return Err(SimError::InvalidConfig(format!(
                "{} slider default {} is outside [{}, {}]",
                name, default, min, max
            )));
        }
        Ok(())
    }

    /// Clamp a value into the slider's range, falling back to the default
    /// for non-finite input
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

fn default_speed_slider() -> SliderConfig {
    SliderConfig { min: 0.01, max: 1.0, step: 0.01, default: 0.1 }
}

fn default_zoom_slider() -> SliderConfig {
    SliderConfig { min: 0.25, max: 3.0, step: 0.05, default: 1.0 }
}

/// How a frame advances the proton
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IntegrationMode {
    /// Fixed displacement per frame; speed depends on the frame rate
    #[default]
    PerFrame,
    /// Displacement scaled by elapsed wall time, expressed in frames of
    /// `reference_hz`
    Elapsed { reference_hz: f64 },
}

impl IntegrationMode {
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            Self::Elapsed { reference_hz } if !(reference_hz.is_finite() && reference_hz > 0.0) => {
                Err(SimError::InvalidConfig(format!(
                    "reference_hz must be a positive number, got {}",
                    reference_hz
                )))
            }
            _ => Ok(()),
        }
    }
}
