use crate::constants::{MAX_FRAME_DELTA_MS, NOMINAL_FRAME_MS};
use instant::Instant;
use std::time::Duration;

/// Accumulated fractional frame counter that drives the growth animation.
///
/// Real elapsed time is converted into nominal frames; each delta is clamped
/// so a stall or a backgrounded tab advances the animation by at most a
/// couple of frames instead of jumping ahead.
#[derive(Clone, Debug)]
pub struct FrameClock {
    frames: f32,
    last_delta_ms: f32,
    last_instant: Option<Instant>,
    frame_ms: f32,
    max_delta_ms: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(NOMINAL_FRAME_MS, MAX_FRAME_DELTA_MS)
    }
}

impl FrameClock {
    pub fn new(frame_ms: f32, max_delta_ms: f32) -> Self {
        Self {
            frames: 0.0,
            last_delta_ms: 0.0,
            last_instant: None,
            frame_ms: frame_ms.max(f32::EPSILON),
            max_delta_ms: max_delta_ms.max(0.0),
        }
    }

    pub fn frames(&self) -> f32 {
        self.frames
    }

    /// Clamped delta of the most recent advance, in milliseconds.
    pub fn last_delta_ms(&self) -> f32 {
        self.last_delta_ms
    }

    /// Advance by an explicit elapsed duration. Returns the new frame count.
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.advance_ms(elapsed.as_secs_f32() * 1000.0)
    }

    /// Advance by elapsed milliseconds, e.g. from a `requestAnimationFrame` timestamp delta.
    pub fn advance_ms(&mut self, elapsed_ms: f32) -> f32 {
        let delta = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, self.max_delta_ms)
        } else {
            0.0
        };
        self.last_delta_ms = delta;
        self.frames += delta / self.frame_ms;
        self.frames
    }

    /// Advance by the wall-clock time since the previous `tick`.
    /// The first call only anchors the clock.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        if let Some(prev) = self.last_instant.replace(now) {
            self.advance(now - prev);
        }
        self.frames
    }
}
