//! Shaping curves for the growth envelope.

/// Fast start, decelerating into 1.
#[inline]
pub fn ease_out_cubic(x: f32) -> f32 {
    let inv = 1.0 - x.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Trapezoidal grow-then-wither envelope over a leaf's local time `t`.
///
/// Ramps 0 -> 1 across the first `enter` fraction, holds at 1, then ramps
/// back 1 -> 0 across the last `leave` fraction. Only the ramps are shaped by
/// [`ease_out_cubic`]; the plateau is exactly 1.
pub fn growth_envelope(t: f32, enter: f32, leave: f32) -> f32 {
    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    let t = t.min(1.0);
    if enter > 0.0 && t <= enter {
        ease_out_cubic(t / enter)
    } else if leave > 0.0 && t > 1.0 - leave {
        ease_out_cubic((1.0 - t) / leave)
    } else {
        1.0
    }
}
