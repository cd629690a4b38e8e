//! Orbit camera driven by mouse drag and wheel.

use glam::{Mat4, Vec3};

use crate::params::OrbitCameraParams;

/// Keeps the camera off the poles so `look_at_rh` never degenerates
const MAX_PITCH_RAD: f32 = 1.5;

/// Camera orbiting a fixed target at a clamped distance
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    params: OrbitCameraParams,
    yaw: f32,
    pitch: f32,
    distance: f32,
    /// Bumped on every change; compared by the renderer to detect stale captures
    revision: u64,
}

impl OrbitCamera {
    pub fn new(params: OrbitCameraParams) -> Self {
        let yaw = params.yaw_rad;
        let pitch = params.pitch_rad.clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
        let distance = params
            .distance_m
            .clamp(params.min_distance_m, params.max_distance_m);
        Self {
            params,
            yaw,
            pitch,
            distance,
            revision: 0,
        }
    }

    /// Rotate by a mouse drag of `(dx, dy)` pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let s = self.params.rotate_sensitivity;
        self.yaw -= dx * s;
        self.pitch = (self.pitch + dy * s).clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
        self.revision += 1;
    }

    /// Zoom by wheel `lines` (positive moves closer)
    pub fn zoom(&mut self, lines: f32) {
        if lines == 0.0 {
            return;
        }
        let factor = (1.0 - self.params.zoom_step).powf(lines);
        self.distance = (self.distance * factor)
            .clamp(self.params.min_distance_m, self.params.max_distance_m);
        self.revision += 1;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.params.target)
    }

    /// World-space eye position
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target() + offset * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target(), Vec3::Y)
    }

    /// Perspective projection with wgpu's 0..1 depth range
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.params.fov_degrees.to_radians(),
            aspect_ratio.max(f32::EPSILON),
            self.params.near_plane_m,
            self.params.far_plane_m,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_eye_distance() {
        let camera = OrbitCamera::new(OrbitCameraParams::default());
        let eye = camera.eye();
        assert!((eye.length() - 250.0).abs() < 1e-3);
        assert!(eye.y > 0.0);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let params = OrbitCameraParams::default();
        let mut camera = OrbitCamera::new(params.clone());

        camera.zoom(1000.0);
        assert_eq!(camera.distance(), params.min_distance_m);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance(), params.max_distance_m);
    }

    #[test]
    fn test_pitch_never_reaches_pole() {
        let mut camera = OrbitCamera::new(OrbitCameraParams::default());
        camera.rotate(0.0, 1.0e6);
        let view = camera.view();
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
        assert!(camera.eye().y < camera.distance());
    }

    #[test]
    fn test_changes_bump_revision() {
        let mut camera = OrbitCamera::new(OrbitCameraParams::default());
        camera.rotate(0.0, 0.0);
        camera.zoom(0.0);
        assert_eq!(camera.revision(), 0);

        camera.rotate(3.0, 0.0);
        camera.zoom(1.0);
        assert_eq!(camera.revision(), 2);
    }

    #[test]
    fn test_view_looks_at_target() {
        let camera = OrbitCamera::new(OrbitCameraParams::default());
        let target_in_view = camera.view().transform_point3(camera.target());
        assert!(target_in_view.x.abs() < 1e-3);
        assert!(target_in_view.y.abs() < 1e-3);
        assert!(target_in_view.z < 0.0);
    }
}
