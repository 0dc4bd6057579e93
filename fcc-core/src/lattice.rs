//! Face-Centered-Cubic Lattice Builder
//!
//! An FCC unit cell carries an atom on each of its 8 corners and on the
//! centre of each of its 6 faces. The builder stamps that 14-site basis into
//! every cell of an `n × n × n` block, shifting cell origins back by half
//! the block's span.
//!
//! ## Properties
//!
//! - **14 sites per cell**: corners shared with neighbours are emitted once
//!   per cell, so the total is exactly `14·n³`
//! - **Running bounds**: every emitted site widens the bounding box
//! - **Deterministic order**: cells iterate x-outer, z-inner; sites follow
//!   [`FCC_BASIS`]

use serde::{Deserialize, Serialize};

use crate::config::LatticeConfig;
use crate::error::SimResult;
use crate::vector::Vec3;

/// Sites per FCC unit cell: 8 corners and 6 face centres
pub const SITES_PER_CELL: usize = 14;

/// Fractional offsets of the FCC basis inside a unit cell
pub const FCC_BASIS: [[f64; 3]; SITES_PER_CELL] = [
    // corners
    [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0],
    // face centres
    [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5],
    [1.0, 0.5, 0.5], [0.5, 1.0, 0.5], [0.5, 0.5, 1.0],
];

/// Number of corner entries at the head of [`FCC_BASIS`]
const CORNER_SITES: usize = 8;

/// Whether a lattice point sits on a cell corner or a face centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    Corner,
    Face,
}

/// A single atom position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticePoint {
    /// World-space position
    pub position: Vec3,
    /// Cell index `(i, j, k)` this point was emitted for
    pub cell: [usize; 3],
    /// Site within the unit cell
    pub kind: SiteKind,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// An inverted box that any included point will replace
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f64::INFINITY),
            max: Vec3::splat(f64::NEG_INFINITY),
        }
    }

    /// A degenerate box containing only `p`
    pub fn at(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// True until the first point is included
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `p`
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(&p);
        self.max = self.max.max(&p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }
}

/// A built FCC lattice and its finalised bounds
#[derive(Debug, Clone)]
pub struct Lattice {
    config: LatticeConfig,
    points: Vec<LatticePoint>,
    bounds: BoundingBox,
}

impl Lattice {
    /// Build the lattice described by `config`
    pub fn build(config: LatticeConfig) -> SimResult<Self> {
        config.validate()?;

        let n = config.lattice_size;
        let u = config.unit_cell_size;
        let offset = config.span() / 2.0;

        let mut points = Vec::with_capacity(config.point_count().unwrap_or_default());
        let mut bounds = BoundingBox::empty();

        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let origin = Vec3::new(
                        i as f64 * u - offset + u / 2.0,
                        j as f64 * u - offset + u / 2.0,
                        k as f64 * u - offset + u / 2.0,
                    );

                    for (site, basis) in FCC_BASIS.iter().enumerate() {
                        let position = origin + Vec3::from(*basis) * u;
                        bounds.include(position);
                        points.push(LatticePoint {
                            position,
                            cell: [i, j, k],
                            kind: if site < CORNER_SITES { SiteKind::Corner } else { SiteKind::Face },
                        });
                    }
                }
            }
        }

        // Nothing was placed; collapse onto the centering target
        if bounds.is_empty() {
            bounds = BoundingBox::at(Vec3::zero());
        }

        tracing::debug!(
            points = points.len(),
            min = ?bounds.min,
            max = ?bounds.max,
            "built FCC lattice"
        );

        Ok(Self { config, points, bounds })
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// All atom positions, in emission order
    pub fn points(&self) -> &[LatticePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Centre of the bounding box; the reference point for the exit check
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }

    /// Lattice corner; the default proton launch position
    pub fn corner(&self) -> Vec3 {
        self.bounds.min
    }

    /// Distance from the centre past which a proton deactivates
    pub fn exit_radius(&self) -> f64 {
        self.config.exit_radius()
    }

    /// Number of distinct atom positions once shared corners and faces are
    /// merged
    pub fn distinct_sites(&self) -> usize {
        // Every site lies on a half-cell grid, so doubling and rounding gives
        // an exact integer key
        let scale = 2.0 / self.config.unit_cell_size;
        let mut keys: Vec<[i64; 3]> = self
            .points
            .iter()
            .map(|p| {
                let q = (p.position - self.bounds.min) * scale;
                [q.x.round() as i64, q.y.round() as i64, q.z.round() as i64]
            })
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}
