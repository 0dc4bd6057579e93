//! Renderer-independent scene layout
//!
//! Everything here is placement arithmetic a renderer would consume: where
//! the wireframe outline sits, where the origin marker and axes helper go,
//! and where the orbit camera is after a zoom change. No drawing happens in
//! this crate.

use serde::{Deserialize, Serialize};

use crate::config::{LatticeConfig, SceneConfig};
use crate::lattice::{BoundingBox, Lattice};
use crate::vector::Vec3;

/// Wireframe box drawn around the lattice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineBox {
    pub center: Vec3,
    pub size: Vec3,
}

impl OutlineBox {
    /// Outline enclosing `bounds` with a margin of one atom radius on every
    /// face
    pub fn around(bounds: &BoundingBox, atom_radius: f64) -> Self {
        Self {
            center: bounds.center(),
            size: bounds.extent() + Vec3::splat(2.0 * atom_radius),
        }
    }
}

/// Orbit camera looking at a fixed target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    base_distance: f64,
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3, base_distance: f64) -> Self {
        Self { position, target, base_distance }
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(&self.target)
    }

    /// Re-place the camera at `base_distance · zoom` from the target while
    /// keeping its current viewing direction
    pub fn apply_zoom(&mut self, zoom: f64) {
        // A camera sitting on its target has no direction; back off along +z
        let direction = (self.position - self.target)
            .normalize()
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
        self.position = self.target + direction * (self.base_distance * zoom);
    }
}

/// Placement of everything drawn besides the atoms and the proton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub outline: OutlineBox,
    /// Origin marker and axes helper sit at the lattice corner
    pub origin_marker: Vec3,
    pub origin_marker_radius: f64,
    pub axes_length: f64,
    pub atom_radius: f64,
    pub proton_radius: f64,
    pub camera: OrbitCamera,
}

impl SceneLayout {
    /// Lay out the scene around a built lattice
    pub fn new(lattice: &Lattice, scene: &SceneConfig) -> Self {
        let LatticeConfig { atom_radius, proton_radius, .. } = *lattice.config();
        let bounds = lattice.bounds();

        let camera = OrbitCamera::new(scene.camera_position, lattice.center(), scene.base_camera_distance);

        Self {
            outline: OutlineBox::around(bounds, atom_radius),
            origin_marker: lattice.corner(),
            origin_marker_radius: scene.origin_marker_radius,
            axes_length: scene.axes_length,
            atom_radius,
            proton_radius,
            camera,
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.apply_zoom(zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_outline_box() {
        let lattice = Lattice::build(LatticeConfig::default()).unwrap();
        let outline = OutlineBox::around(lattice.bounds(), 0.3);

        // extent 10 on every axis plus 2 · 0.3
        assert_relative_eq!(outline.size.x, 10.6);
        assert_relative_eq!(outline.size.y, 10.6);
        assert_relative_eq!(outline.size.z, 10.6);
        assert_eq!(outline.center, Vec3::splat(1.0));
    }

    #[test]
    fn test_layout_places_marker_at_corner() {
        let lattice = Lattice::build(LatticeConfig::default()).unwrap();
        let layout = SceneLayout::new(&lattice, &SceneConfig::default());

        assert_eq!(layout.origin_marker, Vec3::splat(-4.0));
        assert_eq!(layout.axes_length, 5.0);
        assert_relative_eq!(layout.atom_radius, 0.3);
    }

    #[test]
    fn test_zoom_scales_distance() {
        let mut camera = OrbitCamera::new(Vec3::splat(15.0), Vec3::zero(), 15.0);

        camera.apply_zoom(2.0);
        assert_relative_eq!(camera.distance(), 30.0, epsilon = 1e-9);

        camera.apply_zoom(0.5);
        assert_relative_eq!(camera.distance(), 7.5, epsilon = 1e-9);

        // Direction is preserved
        let dir = camera.position.normalize().unwrap();
        let expected = Vec3::splat(1.0).normalize().unwrap();
        assert_relative_eq!(dir.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(dir.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_zoom_with_camera_on_target() {
        let mut camera = OrbitCamera::new(Vec3::zero(), Vec3::zero(), 15.0);
        camera.apply_zoom(1.0);
        assert_relative_eq!(camera.distance(), 15.0, epsilon = 1e-9);
    }
}
