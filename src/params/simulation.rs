//! Simulation tick, ripple lifetime and rain parameters.

/// How simulation ticks are scheduled relative to rendered frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickMode {
    /// One tick per rendered frame (simulation speed follows frame rate)
    PerFrame,
    /// Fixed tick rate driven by wall-clock time, independent of frame rate
    Fixed { hz: f32 },
}

impl Default for TickMode {
    fn default() -> Self {
        Self::Fixed { hz: 30.0 }
    }
}

/// Random rain emission
#[derive(Debug, Clone)]
pub struct RainParams {
    /// Delay numerator: delay ticks = (rand % (base / speed) + offset) / divisor
    pub delay_base: f32,
    pub delay_offset: u32,
    pub delay_divisor: u32,

    /// Resolution of random drop positions (positions are k / resolution)
    pub position_resolution: u32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            delay_base: 2000.0,
            delay_offset: 100,
            delay_divisor: 60,
            position_resolution: 1000,
        }
    }
}

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub tick_mode: TickMode,

    /// Simulation time advanced per tick at speed 1.0 (time units)
    pub time_step: f32,

    /// Light orbit about the X axis per tick at speed 1.0 (radians)
    pub light_step_rad: f32,

    /// Initial light position (meters)
    pub light_start: [f32; 3],

    /// Ripples older than this are removed (time units)
    pub ripple_horizon: f32,

    /// Maximum number of live ripples
    pub ripple_capacity: usize,

    /// Upper bound on ticks replayed in a single frame after a stall
    pub max_catch_up_ticks: u32,

    pub rain: RainParams,

    /// Seed for rain; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_mode: TickMode::default(),
            time_step: 0.02,
            light_step_rad: 0.05,
            light_start: [0.0, 100.0, 0.0],
            ripple_horizon: 30.0,
            ripple_capacity: 100,
            max_catch_up_ticks: 5,
            rain: RainParams::default(),
            seed: None,
        }
    }
}
