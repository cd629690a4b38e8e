//! Simulation time, light orbit, height-map animation and rain.
//!
//! The simulation only advances through [`Simulation::tick`]; how many ticks
//! run per rendered frame is decided by [`SimulationClock`].

use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::params::{SimulationParams, SurfaceControls, TickMode};
use crate::picking::{self, PickOutcome};
use crate::ripples::RippleStore;

/// Converts wall-clock frame time into a number of simulation ticks
#[derive(Debug, Clone)]
pub struct SimulationClock {
    mode: TickMode,
    /// Fixed-mode tick length; unused per frame
    period: Duration,
    accumulator: Duration,
    max_catch_up: u32,
}

impl SimulationClock {
    pub fn new(mode: TickMode, max_catch_up: u32) -> Result<Self> {
        let period = match mode {
            TickMode::PerFrame => Duration::ZERO,
            TickMode::Fixed { hz } => {
                if !(hz.is_finite() && hz > 0.0) {
                    return Err(Error::InvalidParameter(format!(
                        "tick rate must be positive, got {} Hz",
                        hz
                    )));
                }
                Duration::try_from_secs_f32(1.0 / hz)
                    .ok()
                    .filter(|period| !period.is_zero())
                    .ok_or_else(|| {
                        Error::InvalidParameter(format!("tick rate {} Hz is out of range", hz))
                    })?
            }
        };
        Ok(Self {
            mode,
            period,
            accumulator: Duration::ZERO,
            max_catch_up: max_catch_up.max(1),
        })
    }

    /// Ticks owed for a frame that took `frame_time`.
    ///
    /// In fixed mode at most `max_catch_up` ticks are returned; any further
    /// backlog is dropped so a stall does not replay minutes of simulation.
    pub fn ticks_for_frame(&mut self, frame_time: Duration) -> u32 {
        if self.mode == TickMode::PerFrame {
            return 1;
        }
        let period = self.period;

        self.accumulator += frame_time;
        let mut ticks = 0;
        while self.accumulator >= period && ticks < self.max_catch_up {
            self.accumulator -= period;
            ticks += 1;
        }
        if ticks == self.max_catch_up && self.accumulator >= period {
            log::debug!("simulation fell behind, dropping {:?}", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        ticks
    }
}

/// Everything that changes from tick to tick
#[derive(Debug)]
pub struct Simulation {
    params: SimulationParams,
    time: f32,
    light_position: Vec3,
    heightmap_frame: usize,
    heightmap_frames: usize,
    rain_countdown: i32,
    rng: StdRng,
    ripples: RippleStore,
}

impl Simulation {
    pub fn new(params: SimulationParams, heightmap_frames: usize) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ripples = RippleStore::new(params.ripple_capacity, params.ripple_horizon);
        Self {
            light_position: Vec3::from_array(params.light_start),
            params,
            time: 0.0,
            heightmap_frame: 0,
            heightmap_frames,
            rain_countdown: 0,
            rng,
            ripples,
        }
    }

    /// Simulation time (always non-negative)
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    pub fn heightmap_frame(&self) -> usize {
        self.heightmap_frame
    }

    pub fn ripples(&self) -> &RippleStore {
        &self.ripples
    }

    /// Add a ripple at the current simulation time
    pub fn add_ripple(&mut self, position: Vec2) -> Result<()> {
        self.ripples.add_ripple(self.time, position)
    }

    /// Decode a read-back pick pixel, adding a ripple on a hit
    pub fn apply_pick(&mut self, pixel: [f32; 4]) -> Result<PickOutcome> {
        picking::apply_pick(&mut self.ripples, pixel, self.time)
    }

    /// Advance one tick. Does nothing while the controls are paused.
    pub fn tick(&mut self, controls: &SurfaceControls) {
        if !controls.running {
            return;
        }
        let speed = controls.speed.max(0.0);

        self.time += speed * self.params.time_step;

        if self.heightmap_frames > 0 {
            self.heightmap_frame = (self.heightmap_frame + 1) % self.heightmap_frames;
        }

        let orbit = Quat::from_rotation_x(speed * self.params.light_step_rad);
        self.light_position = orbit * self.light_position;

        self.ripples.age_out(self.time);

        if controls.rain {
            self.rain(speed);
        }
    }

    fn rain(&mut self, speed: f32) {
        self.rain_countdown -= 1;
        if self.rain_countdown >= 0 || speed <= 0.0 {
            return;
        }

        let rain = &self.params.rain;
        let modulus = ((rain.delay_base / speed).floor() as u32).max(1);
        let delay = (self.rng.gen_range(0..modulus) + rain.delay_offset) / rain.delay_divisor.max(1);
        self.rain_countdown = delay as i32;

        let resolution = rain.position_resolution.max(1);
        let position = Vec2::new(
            self.rng.gen_range(0..resolution) as f32 / resolution as f32,
            self.rng.gen_range(0..resolution) as f32 / resolution as f32,
        );
        if let Err(e) = self.add_ripple(position) {
            log::warn!("dropped rain ripple: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Simulation {
        let params = SimulationParams {
            seed: Some(7),
            ..SimulationParams::default()
        };
        Simulation::new(params, 4)
    }

    #[test]
    fn test_tick_advances_time_by_speed() {
        let mut sim = seeded();
        let controls = SurfaceControls {
            speed: 2.0,
            ..SurfaceControls::default()
        };
        sim.tick(&controls);
        sim.tick(&controls);
        assert!((sim.time() - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut sim = seeded();
        let controls = SurfaceControls {
            running: false,
            ..SurfaceControls::default()
        };
        sim.tick(&controls);
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.heightmap_frame(), 0);
    }

    #[test]
    fn test_heightmap_frame_wraps() {
        let mut sim = seeded();
        let controls = SurfaceControls::default();
        for _ in 0..5 {
            sim.tick(&controls);
        }
        assert_eq!(sim.heightmap_frame(), 1);
    }

    #[test]
    fn test_light_orbits_about_x() {
        let mut sim = seeded();
        let start = sim.light_position();
        sim.tick(&SurfaceControls::default());
        let p = sim.light_position();

        assert!((p.x - start.x).abs() < 1e-6);
        assert!((p.length() - start.length()).abs() < 1e-3);
        assert!((p.angle_between(start) - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_rain_emits_and_ripples_age_out() {
        let mut sim = seeded();
        let controls = SurfaceControls {
            rain: true,
            ..SurfaceControls::default()
        };
        for _ in 0..200 {
            sim.tick(&controls);
        }
        assert!(!sim.ripples().is_empty());
        for ripple in sim.ripples().iter() {
            assert!(sim.time() - ripple.time <= 30.0);
            assert!(ripple.position.x < 1.0 && ripple.position.y < 1.0);
        }

        // Long after the rain stops every drop has aged out
        let dry = SurfaceControls::default();
        for _ in 0..2000 {
            sim.tick(&dry);
        }
        assert!(sim.ripples().is_empty());
    }

    #[test]
    fn test_rain_is_deterministic_with_seed() {
        let controls = SurfaceControls {
            rain: true,
            ..SurfaceControls::default()
        };
        let (mut a, mut b) = (seeded(), seeded());
        for _ in 0..300 {
            a.tick(&controls);
            b.tick(&controls);
        }
        let ra: Vec<_> = a.ripples().iter().collect();
        let rb: Vec<_> = b.ripples().iter().collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_per_frame_clock_ticks_once() {
        let mut clock = SimulationClock::new(TickMode::PerFrame, 5).unwrap();
        assert_eq!(clock.ticks_for_frame(Duration::from_secs(3)), 1);
        assert_eq!(clock.ticks_for_frame(Duration::ZERO), 1);
    }

    #[test]
    fn test_fixed_clock_accumulates() {
        let mut clock = SimulationClock::new(TickMode::Fixed { hz: 10.0 }, 5).unwrap();
        assert_eq!(clock.ticks_for_frame(Duration::from_millis(50)), 0);
        assert_eq!(clock.ticks_for_frame(Duration::from_millis(60)), 1);
        assert_eq!(clock.ticks_for_frame(Duration::from_millis(200)), 2);
    }

    #[test]
    fn test_fixed_clock_bounds_catch_up() {
        let mut clock = SimulationClock::new(TickMode::Fixed { hz: 30.0 }, 5).unwrap();
        assert_eq!(clock.ticks_for_frame(Duration::from_secs(10)), 5);
        assert_eq!(clock.ticks_for_frame(Duration::ZERO), 0);
    }

    #[test]
    fn test_fixed_clock_rejects_zero_rate() {
        assert!(SimulationClock::new(TickMode::Fixed { hz: 0.0 }, 5).is_err());
    }

    #[test]
    fn test_fixed_clock_rejects_unrepresentable_period() {
        for hz in [1e-30, f32::MIN_POSITIVE, 1e30] {
            assert!(
                matches!(
                    SimulationClock::new(TickMode::Fixed { hz }, 5),
                    Err(Error::InvalidParameter(_))
                ),
                "{} Hz accepted",
                hz
            );
        }
        let mut clock = SimulationClock::new(TickMode::Fixed { hz: 1e-3 }, 5).unwrap();
        assert_eq!(clock.ticks_for_frame(Duration::from_millis(16)), 0);
    }
}
