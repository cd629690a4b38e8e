//! Keyboard shortcuts for the control surface.

use winit::keyboard::KeyCode;

use crate::params::{ShadingMode, SurfaceControls, WaveMode};
use crate::postprocess::EffectFlags;

const AMPLITUDE_STEP: f32 = 1.0;
const WAVELENGTH_STEP: f32 = 0.02;
const SPEED_STEP: f32 = 0.25;

/// One change to the controls, or a request to exit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Shading(ShadingMode),
    Wave(WaveMode),
    ToggleRain,
    ToggleEffect(EffectFlags),
    ToggleRealTimeRender,
    ToggleRunning,
    Amplitude(f32),
    Wavelength(f32),
    Speed(f32),
    Quit,
}

/// Shortcut table
pub fn action_for_key(code: KeyCode) -> Option<ControlAction> {
    use ControlAction::*;

    let action = match code {
        KeyCode::Digit1 => Shading(ShadingMode::None),
        KeyCode::Digit2 => Shading(ShadingMode::Phong),
        KeyCode::Digit3 => Shading(ShadingMode::Smooth),
        KeyCode::Digit4 => Shading(ShadingMode::Toon),
        KeyCode::KeyZ => Wave(WaveMode::Sine),
        KeyCode::KeyX => Wave(WaveMode::HeightMap),
        KeyCode::KeyC => Wave(WaveMode::Interactive),
        KeyCode::KeyR => ToggleRain,
        KeyCode::KeyP => ToggleEffect(EffectFlags::PIXELATION),
        KeyCode::KeyO => ToggleEffect(EffectFlags::OFFSET),
        KeyCode::KeyT => ToggleEffect(EffectFlags::ROTATE),
        KeyCode::KeyL => ToggleRealTimeRender,
        KeyCode::Space => ToggleRunning,
        KeyCode::ArrowUp => Amplitude(AMPLITUDE_STEP),
        KeyCode::ArrowDown => Amplitude(-AMPLITUDE_STEP),
        KeyCode::ArrowRight => Wavelength(WAVELENGTH_STEP),
        KeyCode::ArrowLeft => Wavelength(-WAVELENGTH_STEP),
        KeyCode::Equal => Speed(SPEED_STEP),
        KeyCode::Minus => Speed(-SPEED_STEP),
        KeyCode::Escape => Quit,
        _ => return None,
    };
    Some(action)
}

impl ControlAction {
    /// Apply to `controls`. Returns true when the rendered scene changes
    /// (and the reflection captures need refreshing).
    pub fn apply(self, controls: &mut SurfaceControls) -> bool {
        match self {
            Self::Shading(mode) => controls.shading = mode,
            Self::Wave(mode) => controls.wave = mode,
            Self::ToggleRain => {
                controls.rain = !controls.rain;
                return false;
            }
            Self::ToggleEffect(flag) => {
                controls.effects.toggle(flag);
                return false;
            }
            Self::ToggleRealTimeRender => controls.real_time_render = !controls.real_time_render,
            Self::ToggleRunning => {
                controls.running = !controls.running;
                return false;
            }
            Self::Amplitude(delta) => controls.adjust_amplitude(delta),
            Self::Wavelength(delta) => controls.adjust_wavelength(delta),
            Self::Speed(delta) => {
                controls.adjust_speed(delta);
                return false;
            }
            Self::Quit => return false,
        }
        true
    }

    /// Short description for the log
    pub fn describe(self, controls: &SurfaceControls) -> String {
        match self {
            Self::Shading(mode) => format!("shading: {:?}", mode),
            Self::Wave(mode) => format!("wave: {:?}", mode),
            Self::ToggleRain => format!("rain: {}", controls.rain),
            Self::ToggleEffect(_) => format!("effects: {:?}", controls.effects),
            Self::ToggleRealTimeRender => format!("real-time render: {}", controls.real_time_render),
            Self::ToggleRunning => format!("running: {}", controls.running),
            Self::Amplitude(_) => format!("amplitude: {:.1}", controls.amplitude),
            Self::Wavelength(_) => format!("wavelength: {:.3}", controls.wavelength),
            Self::Speed(_) => format!("speed: {:.2}", controls.speed),
            Self::Quit => "quit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_cover_every_mode() {
        for mode in ShadingMode::ALL {
            let found = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4]
                .into_iter()
                .any(|k| action_for_key(k) == Some(ControlAction::Shading(mode)));
            assert!(found, "no key for {:?}", mode);
        }
        assert_eq!(
            action_for_key(KeyCode::KeyC),
            Some(ControlAction::Wave(WaveMode::Interactive))
        );
        assert_eq!(action_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_effect_toggles_are_independent() {
        let mut controls = SurfaceControls::default();
        for key in [KeyCode::KeyP, KeyCode::KeyT] {
            action_for_key(key).unwrap().apply(&mut controls);
        }
        assert_eq!(controls.effects, EffectFlags::PIXELATION | EffectFlags::ROTATE);

        action_for_key(KeyCode::KeyP).unwrap().apply(&mut controls);
        assert_eq!(controls.effects, EffectFlags::ROTATE);
    }

    #[test]
    fn test_amplitude_key_respects_range() {
        let mut controls = SurfaceControls {
            amplitude: 29.5,
            ..SurfaceControls::default()
        };
        let changed = action_for_key(KeyCode::ArrowUp).unwrap().apply(&mut controls);
        assert!(changed);
        assert_eq!(controls.amplitude, 30.0);
    }

    #[test]
    fn test_post_effects_do_not_dirty_captures() {
        let mut controls = SurfaceControls::default();
        assert!(!ControlAction::ToggleEffect(EffectFlags::OFFSET).apply(&mut controls));
        assert!(!ControlAction::ToggleRunning.apply(&mut controls));
        assert!(!controls.running);
        assert!(ControlAction::Wave(WaveMode::HeightMap).apply(&mut controls));
    }
}
