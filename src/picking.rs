//! Click-to-ripple picking: window coordinates to pick-target pixels, and
//! decoding of the UV-encoded pixel read back from the GPU.

use glam::Vec2;

use crate::error::Result;
use crate::ripples::RippleStore;

/// Clear color of the pick target. Blue stays 1.0 wherever the water was not drawn.
pub const PICK_CLEAR: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

/// Row order of a pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrigin {
    /// Row 0 is the top (windows, wgpu textures)
    TopLeft,
    /// Row 0 is the bottom (OpenGL framebuffers)
    BottomLeft,
}

/// Map a cursor position (window pixels, top-left origin) to a texel of a
/// `target` sized grid with the given origin. Returns `None` outside the window.
pub fn window_to_target(
    cursor: (f64, f64),
    window: (u32, u32),
    target: (u32, u32),
    origin: PixelOrigin,
) -> Option<(u32, u32)> {
    let (x, y) = cursor;
    let (ww, wh) = window;
    let (tw, th) = target;
    if ww == 0 || wh == 0 || tw == 0 || th == 0 {
        return None;
    }
    if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
        return None;
    }
    if x >= ww as f64 || y >= wh as f64 {
        return None;
    }

    let tx = ((x / ww as f64) * tw as f64).floor() as u32;
    let ty = ((y / wh as f64) * th as f64).floor() as u32;
    let (tx, ty) = (tx.min(tw - 1), ty.min(th - 1));
    let ty = match origin {
        PixelOrigin::TopLeft => ty,
        PixelOrigin::BottomLeft => th - 1 - ty,
    };
    Some((tx, ty))
}

/// Result of decoding one pick pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// The click landed on the water at this surface UV
    Hit(Vec2),
    /// Background under the cursor
    Miss,
}

/// Red/green carry the surface UV; blue is 1.0 only where nothing was drawn.
pub fn decode_pick(pixel: [f32; 4]) -> PickOutcome {
    let [r, g, b, _] = pixel;
    if b == 1.0 || !(r.is_finite() && g.is_finite()) {
        return PickOutcome::Miss;
    }
    PickOutcome::Hit(Vec2::new(r, g).clamp(Vec2::ZERO, Vec2::ONE))
}

/// Decode `pixel` and, on a hit, add a ripple at simulation time `now`
pub fn apply_pick(store: &mut RippleStore, pixel: [f32; 4], now: f32) -> Result<PickOutcome> {
    let outcome = decode_pick(pixel);
    match outcome {
        PickOutcome::Hit(uv) => store.add_ripple(now, uv)?,
        PickOutcome::Miss => log::debug!("pick missed the water surface"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blue_one_is_a_miss() {
        let mut store = RippleStore::new(100, 30.0);
        let outcome = apply_pick(&mut store, [0.3, 0.4, 1.0, 1.0], 2.0).unwrap();
        assert_eq!(outcome, PickOutcome::Miss);
        assert!(store.is_empty());
    }

    #[test]
    fn test_hit_inserts_at_red_green() {
        let mut store = RippleStore::new(100, 30.0);
        let outcome = apply_pick(&mut store, [0.25, 0.8, 0.0, 1.0], 7.5).unwrap();
        assert_eq!(outcome, PickOutcome::Hit(Vec2::new(0.25, 0.8)));

        let ripple = store.iter().next().unwrap();
        assert_eq!(ripple.time, 7.5);
        assert_eq!(ripple.position, Vec2::new(0.25, 0.8));
    }

    #[test]
    fn test_cleared_pixel_decodes_as_miss() {
        let clear = PICK_CLEAR.map(|c| c as f32);
        assert_eq!(decode_pick(clear), PickOutcome::Miss);
    }

    #[test]
    fn test_window_to_target_flips_for_bottom_left() {
        let window = (800, 600);
        assert_eq!(
            window_to_target((10.0, 0.0), window, window, PixelOrigin::TopLeft),
            Some((10, 0))
        );
        assert_eq!(
            window_to_target((10.0, 0.0), window, window, PixelOrigin::BottomLeft),
            Some((10, 599))
        );
        assert_eq!(
            window_to_target((799.9, 599.9), window, window, PixelOrigin::BottomLeft),
            Some((799, 0))
        );
    }

    #[test]
    fn test_window_to_target_scales_to_stale_target() {
        let hit = window_to_target((400.0, 300.0), (800, 600), (400, 300), PixelOrigin::TopLeft);
        assert_eq!(hit, Some((200, 150)));
    }

    #[test]
    fn test_clicks_outside_window_are_ignored() {
        let window = (800, 600);
        assert_eq!(window_to_target((-1.0, 5.0), window, window, PixelOrigin::TopLeft), None);
        assert_eq!(window_to_target((800.0, 5.0), window, window, PixelOrigin::TopLeft), None);
        assert_eq!(window_to_target((5.0, 5.0), (0, 0), window, PixelOrigin::TopLeft), None);
    }
}
