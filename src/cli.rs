//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use watersurface::params::{
    RenderConfig, ShadingMode, SimulationParams, SurfaceControls, SurfaceParams, TickMode,
    WaveMode,
};
use watersurface::postprocess::EffectFlags;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "watersurface")]
#[command(about = "Interactive water surface with reflection, refraction and ripples", long_about = None)]
pub struct Args {
    /// Shading: none, phong (default), smooth, toon
    #[arg(long, value_name = "MODE", default_value = "phong")]
    pub shading: String,

    /// Wave source: sine (default), heightmap, interactive
    #[arg(long, value_name = "MODE", default_value = "sine")]
    pub wave: String,

    /// Wave amplitude, 0 to 30
    #[arg(long, default_value = "5")]
    pub amplitude: f32,

    /// Wavelength in surface units, 0.0001 to 1
    #[arg(long, default_value = "0.2")]
    pub wavelength: f32,

    /// Start with periodic random ripples
    #[arg(long)]
    pub rain: bool,

    /// Comma-separated post effects: pixelation, offset, rotate
    #[arg(long, value_name = "LIST")]
    pub effects: Option<String>,

    /// Refresh reflection and refraction every frame
    #[arg(long)]
    pub real_time: bool,

    /// Number of water quads (rounded up to a square grid)
    #[arg(long, default_value = "1600")]
    pub quad_count: i32,

    /// Directory holding 000.png, 001.png, ... height maps
    #[arg(long, value_name = "DIR")]
    pub heightmaps: Option<PathBuf>,

    /// Simulation ticks per second; 0 ticks once per rendered frame
    #[arg(long, value_name = "HZ", default_value = "30")]
    pub tick_rate: f32,

    /// Seed for rain and procedural height maps
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "1024")]
    pub width: u32,

    #[arg(long, default_value = "768")]
    pub height: u32,
}

impl Args {
    pub fn surface_params(&self) -> SurfaceParams {
        SurfaceParams {
            quad_count: self.quad_count,
            ..SurfaceParams::default()
        }
    }

    /// Initial control state. Unknown names fall back to defaults with a warning.
    pub fn controls(&self) -> SurfaceControls {
        let defaults = SurfaceControls::default();

        let shading = ShadingMode::from_name(&self.shading).unwrap_or_else(|| {
            log::warn!("Unknown shading mode '{}', using phong", self.shading);
            defaults.shading
        });
        let wave = WaveMode::from_name(&self.wave).unwrap_or_else(|| {
            log::warn!("Unknown wave mode '{}', using sine", self.wave);
            defaults.wave
        });

        let effects = match &self.effects {
            Some(list) => {
                let (flags, unknown) = EffectFlags::parse_list(list);
                for name in unknown {
                    log::warn!("Unknown effect '{}', ignored", name);
                }
                flags
            }
            None => EffectFlags::empty(),
        };

        SurfaceControls {
            shading,
            wave,
            amplitude: self.amplitude,
            wavelength: self.wavelength,
            rain: self.rain,
            effects,
            real_time_render: self.real_time,
            ..defaults
        }
        .sanitized()
    }

    pub fn simulation_params(&self) -> SimulationParams {
        let tick_mode = if self.tick_rate == 0.0 {
            TickMode::PerFrame
        } else {
            TickMode::Fixed { hz: self.tick_rate }
        };
        SimulationParams {
            tick_mode,
            seed: self.seed,
            ..SimulationParams::default()
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            ..RenderConfig::default()
        }
    }
}
