//! Perspective camera and damped orbit controls.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Camera settings from the scene config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z at startup.
    pub distance: f32,
    /// Enable drag-to-orbit and wheel zoom.
    pub orbit_controls: bool,
    /// Orbit controls keep moving briefly after the drag ends.
    pub damping: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            distance: 5.0,
            orbit_controls: true,
            damping: true,
        }
    }
}

/// Perspective projection looking at a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y_degrees: config.fov_y_degrees,
            aspect,
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, config.distance),
            target: Vec3::ZERO,
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

const DAMPING_FACTOR: f32 = 0.05;
const ROTATE_SPEED: f32 = 0.005;
const PITCH_LIMIT: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 100.0;
/// Below this the pending rotation is dropped.
const REST_EPSILON: f32 = 1e-5;

/// Orbit around a fixed target. Panning is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    pub damping: bool,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl OrbitControls {
    /// Controls matching the camera's current position.
    pub fn new(camera: &PerspectiveCamera, damping: bool) -> Self {
        let offset = camera.position - camera.target;
        let distance = offset.length().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            yaw,
            pitch,
            distance,
            target: camera.target,
            damping,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    /// Queue a rotation from a mouse drag of `(dx, dy)` logical pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * ROTATE_SPEED;
        self.pending_pitch += dy * ROTATE_SPEED;
    }

    /// Zoom by wheel lines; positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance - lines * 0.3).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply queued rotation. Call once per frame.
    pub fn update(&mut self) {
        let factor = if self.damping { DAMPING_FACTOR } else { 1.0 };

        self.yaw += self.pending_yaw * factor;
        self.pitch = (self.pitch + self.pending_pitch * factor).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.pending_yaw *= 1.0 - factor;
        self.pending_pitch *= 1.0 - factor;
        if self.pending_yaw.abs() < REST_EPSILON {
            self.pending_yaw = 0.0;
        }
        if self.pending_pitch.abs() < REST_EPSILON {
            self.pending_pitch = 0.0;
        }
    }

    /// Rotation still waiting to be applied.
    #[cfg(test)]
    fn pending(&self) -> (f32, f32) {
        (self.pending_yaw, self.pending_pitch)
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Move `camera` to the orbit position, looking at the target.
    pub fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(&CameraConfig::default(), 800.0 / 600.0)
    }

    #[test]
    fn test_default_camera_on_positive_z() {
        let cam = camera();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(cam.fov_y_degrees, 75.0);
    }

    #[test]
    fn test_controls_start_at_camera_position() {
        let cam = camera();
        let controls = OrbitControls::new(&cam, true);
        let p = controls.position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_damped_rotation_converges() {
        let mut controls = OrbitControls::new(&camera(), true);
        controls.rotate(-100.0, 0.0);
        let mut last = controls.pending().0.abs();
        for _ in 0..50 {
            controls.update();
            let now = controls.pending().0.abs();
            assert!(now < last || now == 0.0);
            last = now;
        }
        // Total applied rotation approaches the full drag amount.
        assert!(controls.yaw > 0.45 && controls.yaw <= 0.5);
    }

    #[test]
    fn test_undamped_rotation_applies_immediately() {
        let mut controls = OrbitControls::new(&camera(), false);
        controls.rotate(-100.0, 0.0);
        controls.update();
        assert_relative_eq!(controls.yaw, 0.5, epsilon = 1e-6);
        assert_eq!(controls.pending(), (0.0, 0.0));
    }

    #[test]
    fn test_pitch_is_clamped_and_target_fixed() {
        let mut controls = OrbitControls::new(&camera(), false);
        controls.rotate(0.0, 10_000.0);
        controls.update();
        assert_eq!(controls.pitch, PITCH_LIMIT);
        assert_eq!(controls.target, Vec3::ZERO);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut controls = OrbitControls::new(&camera(), true);
        controls.zoom(1000.0);
        assert_eq!(controls.distance, MIN_DISTANCE);
        controls.zoom(-10_000.0);
        assert_eq!(controls.distance, MAX_DISTANCE);
    }
}
