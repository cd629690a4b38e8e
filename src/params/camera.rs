//! Orbit camera configuration.

/// Orbit camera around a fixed target (arcball-style viewer)
#[derive(Debug, Clone)]
pub struct OrbitCameraParams {
    /// Look-at target (meters)
    pub target: [f32; 3],

    /// Initial distance from target (meters)
    pub distance_m: f32,

    /// Zoom limits (meters)
    pub min_distance_m: f32,
    pub max_distance_m: f32,

    /// Initial rotation about the world Y axis (radians)
    pub yaw_rad: f32,

    /// Initial elevation above the horizon (radians, positive looks down)
    pub pitch_rad: f32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Clip planes (meters)
    pub near_plane_m: f32,
    pub far_plane_m: f32,

    /// Radians of rotation per pixel of drag
    pub rotate_sensitivity: f32,

    /// Fractional distance change per wheel line
    pub zoom_step: f32,
}

impl Default for OrbitCameraParams {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, 0.0],
            distance_m: 250.0,
            min_distance_m: 20.0,
            max_distance_m: 900.0,
            yaw_rad: 0.2,
            pitch_rad: 0.4,
            fov_degrees: 40.0,
            near_plane_m: 1.0,
            far_plane_m: 3000.0, // Sky box sits at 1000m from the eye
            rotate_sensitivity: 0.005,
            zoom_step: 0.1,
        }
    }
}
