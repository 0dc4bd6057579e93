//! Proton Trajectory Simulator
//!
//! A two-state machine. Launching moves it to `Active` with a constant
//! per-tick displacement; every tick while active adds that displacement to
//! the position and records it in the trail. Leaving the exit sphere around
//! the lattice centre, or a reset, returns it to `Idle`.
//!
//! ```text
//!            launch(v ≠ 0)                 tick: |p − c| > r
//!   ┌──────┐ ──────────────▶ ┌────────┐ ─────────────────────▶ Idle
//!   │ Idle │                 │ Active │
//!   └──────┘ ◀────────────── └────────┘ ◀─┐
//!                  reset                  │ tick: p += v, trail.push(p)
//!                                         └─
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::vector::Vec3;

/// Simulator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimState {
    Idle,
    Active,
}

/// The simulated point mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proton {
    pub position: Vec3,
    /// Displacement applied per tick
    pub velocity: Vec3,
}

/// Positions recorded since the last launch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: Vec<Vec3>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, p: Vec3) {
        self.points.push(p);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn last(&self) -> Option<&Vec3> {
        self.points.last()
    }

    /// Flatten into an `x0 y0 z0 x1 y1 z1 ...` vertex buffer
    pub fn to_f32_buffer(&self) -> Vec<f32> {
        self.points
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Total path length along the trail
    pub fn path_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Everything needed to launch the proton
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchCommand {
    /// Start position
    pub position: Vec3,
    /// Raw direction as typed by the user
    pub direction: Vec3,
    /// Rescale `direction` to unit length before applying `speed`
    pub normalize: bool,
    pub speed: f64,
}

impl LaunchCommand {
    /// Direction after optional normalisation
    ///
    /// Rejects non-finite and zero vectors; those never produce a launch.
    pub fn effective_direction(&self) -> SimResult<Vec3> {
        let d = self.direction;
        if !d.is_finite() {
            return Err(SimError::InvalidVector(d.x, d.y, d.z));
        }
        if d.length() == 0.0 {
            return Err(SimError::ZeroVelocity);
        }
        if self.normalize {
            d.normalize().ok_or(SimError::ZeroVelocity)
        } else {
            Ok(d)
        }
    }

    /// Per-tick displacement this command produces
    pub fn velocity(&self) -> SimResult<Vec3> {
        let direction = self.effective_direction()?;
        if !self.speed.is_finite() {
            return Err(SimError::InvalidSpeed(self.speed));
        }
        Ok(direction * self.speed)
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Simulator was idle; nothing moved
    Idle,
    /// Proton advanced and is still inside the exit sphere
    Moved { position: Vec3 },
    /// Proton advanced past the exit sphere and deactivated
    Exited { position: Vec3, distance: f64 },
}

/// Straight-line trajectory state machine
#[derive(Debug, Clone)]
pub struct Simulator {
    proton: Proton,
    state: SimState,
    trail: Trail,
    /// Position restored on reset
    home: Vec3,
    center: Vec3,
    exit_radius: f64,
    ticks: u64,
}

impl Simulator {
    /// Create an idle simulator parked at `home`
    pub fn new(home: Vec3, center: Vec3, exit_radius: f64) -> Self {
        Self {
            proton: Proton { position: home, velocity: Vec3::zero() },
            state: SimState::Idle,
            trail: Trail::new(),
            home,
            center,
            exit_radius,
            ticks: 0,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SimState::Active
    }

    pub fn proton(&self) -> &Proton {
        &self.proton
    }

    pub fn position(&self) -> Vec3 {
        self.proton.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.proton.velocity
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Ticks since the most recent launch
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn exit_radius(&self) -> f64 {
        self.exit_radius
    }

    /// Move the proton without touching state, velocity or trail
    pub fn set_position(&mut self, position: Vec3) {
        self.proton.position = position;
    }

    /// Start a new episode
    ///
    /// On error nothing changes: state, position and trail stay as they were.
    pub fn launch(&mut self, command: &LaunchCommand) -> SimResult<Vec3> {
        let velocity = match command.velocity() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(direction = ?command.direction, "launch rejected: {}", e);
                return Err(e);
            }
        };

        self.proton.position = command.position;
        self.proton.velocity = velocity;
        self.trail.clear();
        self.ticks = 0;
        self.state = SimState::Active;

        tracing::debug!(position = ?command.position, velocity = ?velocity, "proton launched");
        Ok(velocity)
    }

    /// Advance one frame with the fixed per-tick displacement
    pub fn tick(&mut self) -> TickOutcome {
        self.advance(1.0)
    }

    /// Advance by `elapsed_frames` worth of displacement
    ///
    /// Counts as one tick for the trail regardless of `elapsed_frames`.
    pub fn advance(&mut self, elapsed_frames: f64) -> TickOutcome {
        if self.state == SimState::Idle {
            return TickOutcome::Idle;
        }

        self.proton.position += self.proton.velocity * elapsed_frames;
        self.trail.push(self.proton.position);
        self.ticks += 1;

        let distance = self.proton.position.distance(&self.center);
        if distance > self.exit_radius {
            self.state = SimState::Idle;
            tracing::debug!(ticks = self.ticks, distance, "proton left the exit sphere");
            return TickOutcome::Exited { position: self.proton.position, distance };
        }

        TickOutcome::Moved { position: self.proton.position }
    }

    /// Return to the idle, parked state
    pub fn reset(&mut self) {
        self.state = SimState::Idle;
        self.trail.clear();
        self.ticks = 0;
        self.proton = Proton { position: self.home, velocity: Vec3::zero() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn simulator() -> Simulator {
        // Reference lattice: corner (-4,-4,-4), centre (1,1,1), exit radius 20
        Simulator::new(Vec3::splat(-4.0), Vec3::splat(1.0), 20.0)
    }

    fn command(direction: Vec3, normalize: bool, speed: f64) -> LaunchCommand {
        LaunchCommand { position: Vec3::splat(-4.0), direction, normalize, speed }
    }

    #[test]
    fn test_zero_vector_rejected() {
        let mut sim = simulator();
        let result = sim.launch(&command(Vec3::zero(), true, 0.1));

        assert!(matches!(result, Err(SimError::ZeroVelocity)));
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.velocity(), Vec3::zero());
    }

    #[test]
    fn test_zero_vector_keeps_existing_trail() {
        let mut sim = simulator();
        sim.launch(&command(Vec3::new(0.0, 0.0, 1.0), true, 0.1)).unwrap();
        for _ in 0..5 {
            sim.tick();
        }
        let before = sim.trail().clone();
        let position = sim.position();

        assert!(sim.launch(&command(Vec3::zero(), true, 0.1)).is_err());
        assert_eq!(sim.trail(), &before);
        assert_eq!(sim.position(), position);
        assert_eq!(sim.state(), SimState::Active);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut sim = simulator();
        assert!(matches!(
            sim.launch(&command(Vec3::new(f64::NAN, 0.0, 1.0), true, 0.1)),
            Err(SimError::InvalidVector(..))
        ));
        assert!(matches!(
            sim.launch(&command(Vec3::new(0.0, 0.0, 1.0), true, f64::INFINITY)),
            Err(SimError::InvalidSpeed(_))
        ));
        assert_eq!(sim.state(), SimState::Idle);
    }

    #[test]
    fn test_ticks_advance_linearly() {
        let mut sim = simulator();
        let start = Vec3::splat(-4.0);
        sim.launch(&command(Vec3::new(0.0, 0.0, 1.0), true, 0.1)).unwrap();

        sim.tick();
        assert_relative_eq!(sim.position().z, start.z + 0.1, epsilon = 1e-12);
        assert_eq!(sim.trail().len(), 1);

        for k in 2..=25u32 {
            sim.tick();
            let p = sim.position();
            assert_eq!(p.x, start.x);
            assert_eq!(p.y, start.y);
            assert_relative_eq!(p.z, start.z + 0.1 * k as f64, epsilon = 1e-9);
            assert_eq!(sim.trail().len(), k as usize);
            assert_eq!(sim.ticks(), k as u64);
        }
    }

    #[test]
    fn test_raw_direction_scaled_by_speed() {
        let mut sim = simulator();
        let v = sim.launch(&command(Vec3::new(0.0, 2.0, 0.0), false, 0.5)).unwrap();
        assert_eq!(v, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_exit_on_first_tick_past_radius() {
        // Centre at origin, radius 1, step 0.3 along x: 0.3 0.6 0.9 1.2
        let mut sim = Simulator::new(Vec3::zero(), Vec3::zero(), 1.0);
        sim.launch(&LaunchCommand {
            position: Vec3::zero(),
            direction: Vec3::new(1.0, 0.0, 0.0),
            normalize: true,
            speed: 0.3,
        })
        .unwrap();

        for _ in 0..3 {
            assert!(matches!(sim.tick(), TickOutcome::Moved { .. }));
            assert!(sim.is_active());
        }
        assert!(matches!(sim.tick(), TickOutcome::Exited { .. }));
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.trail().len(), 4);

        // Idle does no work
        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(sim.trail().len(), 4);
    }

    #[test]
    fn test_exact_radius_does_not_exit() {
        let mut sim = Simulator::new(Vec3::zero(), Vec3::zero(), 1.0);
        sim.launch(&LaunchCommand {
            position: Vec3::zero(),
            direction: Vec3::new(0.0, 1.0, 0.0),
            normalize: false,
            speed: 0.5,
        })
        .unwrap();

        sim.tick();
        sim.tick();
        assert_eq!(sim.position().y, 1.0);
        assert!(sim.is_active());
        assert!(matches!(sim.tick(), TickOutcome::Exited { .. }));
    }

    #[test]
    fn test_reference_lattice_exit_tick() {
        // From (-4,-4,-4) along +z at 0.1: distance to (1,1,1) is
        // sqrt(50 + (z-1)²), which first exceeds 20 once z - 1 > sqrt(350)
        let mut sim = simulator();
        sim.launch(&command(Vec3::new(0.0, 0.0, 1.0), true, 0.1)).unwrap();

        let mut ticks = 0;
        while sim.is_active() {
            sim.tick();
            ticks += 1;
        }

        let threshold = 1.0 + 350f64.sqrt();
        let z = sim.position().z;
        assert!(z - 1.0 > 350f64.sqrt());
        assert!(z - 0.1 <= threshold + 1e-9);
        assert_eq!(sim.trail().len(), ticks);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut sim = simulator();
        sim.launch(&command(Vec3::new(1.0, 1.0, 0.0), true, 0.2)).unwrap();
        sim.tick();
        sim.tick();

        sim.reset();
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.position(), Vec3::splat(-4.0));
        assert_eq!(sim.velocity(), Vec3::zero());
        assert!(sim.trail().is_empty());

        // Reset while idle is a no-op on an already parked proton
        sim.set_position(Vec3::new(3.0, 3.0, 3.0));
        sim.reset();
        assert_eq!(sim.position(), Vec3::splat(-4.0));
    }

    #[test]
    fn test_relaunch_clears_trail() {
        let mut sim = simulator();
        sim.launch(&command(Vec3::new(1.0, 0.0, 0.0), true, 0.1)).unwrap();
        for _ in 0..10 {
            sim.tick();
        }
        sim.launch(&command(Vec3::new(0.0, 1.0, 0.0), true, 0.1)).unwrap();
        assert!(sim.trail().is_empty());
        assert_eq!(sim.position(), Vec3::splat(-4.0));
        sim.tick();
        assert_eq!(sim.trail().len(), 1);
    }

    #[test]
    fn test_advance_scales_displacement() {
        let mut sim = simulator();
        sim.launch(&command(Vec3::new(0.0, 0.0, 1.0), true, 0.1)).unwrap();

        sim.advance(2.5);
        assert_relative_eq!(sim.position().z, -4.0 + 0.25, epsilon = 1e-12);
        assert_eq!(sim.trail().len(), 1);
    }

    #[test]
    fn test_trail_buffer() {
        let mut trail = Trail::new();
        trail.push(Vec3::new(1.0, 2.0, 3.0));
        trail.push(Vec3::new(1.0, 2.0, 5.0));

        assert_eq!(trail.to_f32_buffer(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 5.0]);
        assert_relative_eq!(trail.path_length(), 2.0);
    }
}
