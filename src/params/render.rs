//! Window and scene rendering configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical sync
    pub vsync: bool,

    /// Clear color of every offscreen pass (linear RGBA)
    pub clear_color: [f64; 4],

    /// Half side of the sky box, centered on the eye (meters)
    pub sky_extent_m: f32,

    /// Half side of the tiled pool (meters)
    pub pool_half_extent_m: f32,

    /// Depth of the pool floor below the origin (meters)
    pub pool_depth_m: f32,

    /// Height of the pool walls (meters)
    pub pool_wall_height_m: f32,

    /// Side length of the light box (meters)
    pub light_box_size_m: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            vsync: true,
            clear_color: [0.0, 0.0, 0.3, 0.0], // Dark blue behind everything
            sky_extent_m: 1000.0,
            pool_half_extent_m: 100.0,
            pool_depth_m: 50.0,
            pool_wall_height_m: 100.0,
            light_box_size_m: 10.0,
        }
    }
}
