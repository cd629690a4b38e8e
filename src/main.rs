//! watersurface - an interactive water surface over a tiled pool
//!
//! Reflections and refractions are captured from mirrored cameras, the
//! surface follows a sine wave, a height-map sequence or clicked ripples.

mod cli;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use watersurface::camera::OrbitCamera;
use watersurface::heightmap::HeightmapSequence;
use watersurface::input::{action_for_key, ControlAction};
use watersurface::params::*;
use watersurface::picking::PickOutcome;
use watersurface::rendering::{FrameContext, RenderSystem};
use watersurface::simulation::{Simulation, SimulationClock};
use watersurface::Error;

/// Wheel pixels per scrolled line on touchpads
const PIXELS_PER_LINE: f64 = 40.0;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    heightmaps: HeightmapSequence,

    // Simulation
    simulation: Simulation,
    clock: SimulationClock,
    camera: OrbitCamera,
    controls: SurfaceControls,
    scene_revision: u64,

    // Configuration
    surface_params: SurfaceParams,
    render_config: RenderConfig,

    // Pointer state
    cursor: (f64, f64),
    rotating: bool,

    // Time tracking
    start_time: Instant,
    last_frame: Instant,

    /// First fatal error, returned from `main` after the loop exits
    error: Option<Error>,
}

impl App {
    fn new(args: &cli::Args) -> watersurface::Result<Self> {
        let simulation_params = args.simulation_params();
        let seed = simulation_params.seed.unwrap_or(0) as u32;
        let heightmaps = HeightmapSequence::load_or_generate(args.heightmaps.as_deref(), seed)?;

        let clock = SimulationClock::new(
            simulation_params.tick_mode,
            simulation_params.max_catch_up_ticks,
        )?;
        let simulation = Simulation::new(simulation_params, heightmaps.frame_count());

        Ok(Self {
            window: None,
            render_system: None,
            heightmaps,
            simulation,
            clock,
            camera: OrbitCamera::new(OrbitCameraParams::default()),
            controls: args.controls(),
            scene_revision: 0,
            surface_params: args.surface_params(),
            render_config: args.render_config(),
            cursor: (0.0, 0.0),
            rotating: false,
            start_time: Instant::now(),
            last_frame: Instant::now(),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> watersurface::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("watersurface")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.surface_params.clone(),
            self.render_config.clone(),
            &self.heightmaps,
        ))?;

        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        match self.init(event_loop) {
            Ok(()) => println!("\nwatersurface is running!\n"),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match action_for_key(code) {
                Some(ControlAction::Quit) => event_loop.exit(),
                Some(action) => {
                    if action.apply(&mut self.controls) {
                        self.scene_revision += 1;
                    }
                    log::info!("{}", action.describe(&self.controls));
                }
                None => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x, position.y);
                if self.rotating {
                    self.camera
                        .rotate((x - self.cursor.0) as f32, (y - self.cursor.1) as f32);
                }
                self.cursor = (x, y);
            }
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Right, state) => self.rotating = state == ElementState::Pressed,
                (MouseButton::Left, ElementState::Pressed)
                    if self.controls.wave == WaveMode::Interactive =>
                {
                    self.pick();
                }
                _ => {}
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                self.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    /// Read the water UV under the cursor and drop a ripple there
    fn pick(&mut self) {
        let Some(render_system) = &mut self.render_system else {
            return;
        };
        match render_system.pick(self.cursor, &self.camera) {
            Ok(Some(pixel)) => match self.simulation.apply_pick(pixel) {
                Ok(PickOutcome::Hit(uv)) => log::debug!("Ripple at {:.3}, {:.3}", uv.x, uv.y),
                Ok(PickOutcome::Miss) => {}
                Err(e) => log::warn!("Ripple rejected: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Pick failed: {}", e),
        }
    }

    /// Advance the simulation and render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let ticks = self.clock.ticks_for_frame(now - self.last_frame);
        self.last_frame = now;
        for _ in 0..ticks {
            self.simulation.tick(&self.controls);
        }

        let Some(render_system) = &mut self.render_system else {
            return;
        };
        let ctx = FrameContext {
            camera: &self.camera,
            simulation: &self.simulation,
            controls: &self.controls,
            scene_revision: self.scene_revision,
            elapsed: self.start_time.elapsed().as_secs_f32(),
        };

        match render_system.render(&ctx) {
            Ok(()) => {}
            Err(Error::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(Error::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                self.fail(event_loop, Error::Surface(wgpu::SurfaceError::OutOfMemory));
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }
}

fn main() -> watersurface::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();

    println!("watersurface - interactive water surface");
    println!("Right-drag orbits, wheel zooms, left-click drops a ripple (interactive mode)");
    println!("1-4 shading | Z/X/C wave | R rain | P/O/T effects | L real-time | Space pause | Esc quit\n");

    let mut app = App::new(&args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
