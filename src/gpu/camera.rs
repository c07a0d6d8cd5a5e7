//! Orbit camera for the viewer.

use glam::{Mat4, Vec3};

use crate::scene::BucketGrid;

const FOV_Y_DEGREES: f32 = 45.0;
const MIN_DISTANCE: f32 = 0.1;
const ORBIT_SPEED: f32 = 0.005;
const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Upper bound on `distance`.
    pub max_distance: f32,
}

impl Camera {
    /// Create a new camera with default positioning.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 3.0,
            target: Vec3::ZERO,
            max_distance: 20.0,
        }
    }

    /// Aim at the center of a bucket lattice from far enough to see all of it.
    pub fn framing(grid: &BucketGrid) -> Self {
        let radius = (grid.max_corner() - grid.min_corner).length() * 0.5;
        let mut camera = Self::new();
        camera.target = grid.center();
        if radius > 0.0 {
            let half_fov = (FOV_Y_DEGREES * 0.5).to_radians();
            camera.distance = radius / half_fov.sin();
            camera.max_distance = camera.distance * 4.0;
        }
        camera
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Projection times view for a surface of the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let far = (self.distance * 4.0).max(100.0);
        let near = (self.distance * 0.01).max(0.01);
        let proj = Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, near, far);
        proj * self.view_matrix()
    }

    /// Rotate by a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_SPEED;
        self.pitch = (self.pitch + dy * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, scroll: f32) {
        let step = self.distance * 0.1 * scroll;
        self.distance = (self.distance - step).clamp(MIN_DISTANCE, self.max_distance);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    #[test]
    fn test_framing_centers_on_lattice() {
        let grid = BucketGrid {
            min_corner: Vec3::splat(-1.0),
            bucket_length: 1.0,
            dims: UVec3::splat(2),
        };
        let camera = Camera::framing(&grid);
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.distance > 3.0_f32.sqrt());
        assert!(((camera.position() - camera.target).length() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut camera = Camera::new();
        camera.orbit(0.0, 1.0e6);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.orbit(0.0, -1.0e6);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut camera = Camera::new();
        for _ in 0..200 {
            camera.zoom(5.0);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);
        for _ in 0..200 {
            camera.zoom(-5.0);
        }
        assert_eq!(camera.distance, camera.max_distance);
    }
}
