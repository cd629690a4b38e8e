//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Units (meters, radians, simulation time units, ticks)
//! - Documented ranges and meanings
//! - Type safety where possible

mod camera;
mod render;
mod simulation;
mod surface;

// Re-export all types
pub use camera::OrbitCameraParams;
pub use render::RenderConfig;
pub use simulation::{RainParams, SimulationParams, TickMode};
pub use surface::{ShadingMode, SurfaceControls, SurfaceParams, WaveMode};
