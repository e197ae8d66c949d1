//! Grid Snapping Module
//!
//! Snapping helpers for placing blocks on the build plate and against the
//! faces of other blocks.
//!
//! ## Bias
//! Values that land almost exactly on a half-step would flicker between two
//! cells as the cursor moves by sub-pixel amounts. Every snap nudges the
//! value away from zero by `step * bias_ratio` before rounding.

use glam::Vec3;

/// Default bias ratio applied by [`snap`].
pub const DEFAULT_SNAP_BIAS: f32 = 1e-4;

/// Round `value` to the nearest multiple of `step`.
///
/// A non-positive `step` leaves the value untouched.
pub fn snap(value: f32, step: f32, bias_ratio: f32) -> f32 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    let eps = step * bias_ratio;
    let biased = if value >= 0.0 { value + eps } else { value - eps };
    (biased / step).round() * step
}

/// Snap X and Z of `pos` to cells of `step`; Y is preserved.
pub fn snap_to_grid(pos: Vec3, step: Vec3, bias_ratio: f32) -> Vec3 {
    Vec3::new(
        snap(pos.x, step.x, bias_ratio),
        pos.y,
        snap(pos.z, step.z, bias_ratio),
    )
}

/// Snap `value` along a target block's footprint and clamp it inside.
///
/// The footprint runs from `min` to `max`; a candidate of half size `half`
/// must keep its center in `[min + half, max - half]`. Within half a step of
/// either end the value sticks to that end; otherwise it snaps to the grid
/// anchored at the near end.
pub fn clamp_snap(value: f32, min: f32, max: f32, half: f32, step: f32, bias_ratio: f32) -> f32 {
    let bottom = min + half;
    let top = max - half;

    let mut v = snap(value - bottom, step, bias_ratio) + bottom;
    if (value - top).abs() <= step * 0.5 {
        v = top;
    }
    if (value - bottom).abs() <= step * 0.5 {
        v = bottom;
    }
    // Candidates larger than the footprint end up centered on `top`.
    v.max(bottom).min(top)
}
