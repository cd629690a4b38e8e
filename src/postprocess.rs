//! Screen-space effects applied when the main frame is composited to the window.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

bitflags! {
    /// Independent post-process toggles, passed to the shader as a bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EffectFlags: u32 {
        /// Snap sampling to a coarse pixel grid.
        const PIXELATION = 1 << 0;
        /// Wobble sampling coordinates over time.
        const OFFSET = 1 << 1;
        /// Swirl the image around its center.
        const ROTATE = 1 << 2;
    }
}

impl EffectFlags {
    /// Parse a comma-separated list such as `"pixel,rotate"`.
    /// Returns the recognized flags and every unknown name.
    pub fn parse_list(list: &str) -> (Self, Vec<String>) {
        let mut flags = Self::empty();
        let mut unknown = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.to_lowercase().as_str() {
                "pixel" | "pixelation" => flags |= Self::PIXELATION,
                "offset" => flags |= Self::OFFSET,
                "rotate" => flags |= Self::ROTATE,
                _ => unknown.push(name.to_string()),
            }
        }
        (flags, unknown)
    }
}

/// Uniform buffer for the composition shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PostUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub effects: u32,
}

impl PostUniforms {
    pub fn new(effects: EffectFlags, time: f32, width: u32, height: u32) -> Self {
        Self {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            time,
            effects: effects.bits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_independent_bits() {
        let all = EffectFlags::PIXELATION | EffectFlags::OFFSET | EffectFlags::ROTATE;
        assert_eq!(all.bits(), 0b111);

        let mut flags = all;
        flags.toggle(EffectFlags::OFFSET);
        assert!(flags.contains(EffectFlags::PIXELATION | EffectFlags::ROTATE));
        assert!(!flags.contains(EffectFlags::OFFSET));
    }

    #[test]
    fn test_parse_list_collects_unknown_names() {
        let (flags, unknown) = EffectFlags::parse_list("pixel, Rotate,blur,");
        assert_eq!(flags, EffectFlags::PIXELATION | EffectFlags::ROTATE);
        assert_eq!(unknown, vec!["blur".to_string()]);
        assert_eq!(EffectFlags::parse_list("").0, EffectFlags::empty());
    }

    #[test]
    fn test_uniforms_layout() {
        assert_eq!(std::mem::size_of::<PostUniforms>(), 16);
        let u = PostUniforms::new(EffectFlags::ROTATE, 2.5, 0, 600);
        assert_eq!(u.resolution, [1.0, 600.0]);
        assert_eq!(u.effects, 4);
    }
}
