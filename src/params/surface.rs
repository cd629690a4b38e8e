//! Water surface geometry parameters and the per-frame control surface.

use crate::postprocess::EffectFlags;

/// Lighting model applied to the scene and the water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Flat color, no lighting
    None,
    /// Per-fragment Phong
    #[default]
    Phong,
    /// Per-vertex (Gouraud) lighting, interpolated
    Smooth,
    /// Quantized diffuse bands
    Toon,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 4] = [Self::None, Self::Phong, Self::Smooth, Self::Toon];

    /// Index consumed by the shaders (`shading_mode` uniform)
    pub fn shader_index(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Phong => 1,
            Self::Smooth => 2,
            Self::Toon => 3,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "phong" => Some(Self::Phong),
            "smooth" | "gouraud" => Some(Self::Smooth),
            "toon" => Some(Self::Toon),
            _ => None,
        }
    }
}

/// Source of the water height field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveMode {
    /// Directional sine wave driven by amplitude and wavelength
    #[default]
    Sine,
    /// Animated height-map sequence
    HeightMap,
    /// Rings spreading from the live ripple set; enables click-to-ripple
    Interactive,
}

impl WaveMode {
    pub fn shader_index(self) -> u32 {
        match self {
            Self::Sine => 0,
            Self::HeightMap => 1,
            Self::Interactive => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sine" => Some(Self::Sine),
            "heightmap" | "height-map" => Some(Self::HeightMap),
            "interactive" => Some(Self::Interactive),
            _ => None,
        }
    }
}

/// Static description of the water patch (fixed for the session)
#[derive(Debug, Clone)]
pub struct SurfaceParams {
    /// Requested quad count; the grid is rounded up to a square of
    /// `ceil(sqrt(quad_count))` quads per side
    pub quad_count: i32,

    /// Half side length of the water patch (meters)
    pub half_extent_m: f32,

    /// Height of the rest plane (meters); also the reflection plane
    pub water_level_m: f32,

    /// Vertical scale applied to the wave height in the model matrix
    pub height_scale: f32,

    /// Base tint of the water (linear RGB)
    pub color: [f32; 3],

    /// Subdivisions per patch edge when patches are tessellated on upload
    pub tessellation_level: u32,

    /// Travel direction of the sine wave in surface space
    pub wave_direction: [f32; 2],

    /// Depth compression of the refraction camera (1.0 = none).
    /// 0.75 approximates the apparent depth of water (1 / 1.33).
    pub refraction_depth_scale: f32,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            quad_count: 1600,
            half_extent_m: 100.0,
            water_level_m: 5.0,
            height_scale: 10.0,
            color: [51.0 / 255.0, 204.0 / 255.0, 1.0],
            tessellation_level: 4,
            wave_direction: [1.0, -1.0],
            refraction_depth_scale: 0.75,
        }
    }
}

/// User-adjustable controls, read once per frame
#[derive(Debug, Clone)]
pub struct SurfaceControls {
    pub shading: ShadingMode,
    pub wave: WaveMode,

    /// Wave amplitude, range [0, 30]
    pub amplitude: f32,

    /// Wavelength, range [0.0001, 1]
    pub wavelength: f32,

    /// Periodic random ripples
    pub rain: bool,

    /// Post-process toggles
    pub effects: EffectFlags,

    /// Refresh reflection/refraction captures every frame
    pub real_time_render: bool,

    /// Simulation speed multiplier, range [0, 5]
    pub speed: f32,

    /// Simulation ticks advance only while running
    pub running: bool,
}

impl SurfaceControls {
    pub const AMPLITUDE_RANGE: (f32, f32) = (0.0, 30.0);
    pub const WAVELENGTH_RANGE: (f32, f32) = (0.0001, 1.0);
    pub const SPEED_RANGE: (f32, f32) = (0.0, 5.0);

    pub fn adjust_amplitude(&mut self, delta: f32) {
        let (lo, hi) = Self::AMPLITUDE_RANGE;
        self.amplitude = (self.amplitude + delta).clamp(lo, hi);
    }

    pub fn adjust_wavelength(&mut self, delta: f32) {
        let (lo, hi) = Self::WAVELENGTH_RANGE;
        self.wavelength = (self.wavelength + delta).clamp(lo, hi);
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        let (lo, hi) = Self::SPEED_RANGE;
        self.speed = (self.speed + delta).clamp(lo, hi);
    }

    /// Clamp every ranged value into its documented range
    pub fn sanitized(mut self) -> Self {
        self.adjust_amplitude(0.0);
        self.adjust_wavelength(0.0);
        self.adjust_speed(0.0);
        self
    }
}

impl Default for SurfaceControls {
    fn default() -> Self {
        Self {
            shading: ShadingMode::Phong,
            wave: WaveMode::Sine,
            amplitude: 5.0,
            wavelength: 0.2,
            rain: false,
            effects: EffectFlags::empty(),
            real_time_render: false,
            speed: 1.0,
            running: true,
        }
    }
}
