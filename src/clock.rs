//! Frame driver timing
//!
//! Turns host timestamps (ms, one per display refresh) into clamped deltas.
//! There is no fixed-timestep accumulator: the clamp is the only bound on step size.

use crate::consts::{MAX_FRAME_DELTA_MS, REFERENCE_FRAME_MS};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_time: None }
    }

    /// Consume a frame timestamp and return the delta to simulate (ms)
    ///
    /// The first frame, a repeated timestamp, or a timestamp that went
    /// backwards all count as one reference frame.
    pub fn advance(&mut self, now: f64) -> f32 {
        let raw = self.last_time.map(|last| now - last).unwrap_or(0.0);
        self.last_time = Some(now);
        clamp_delta(raw)
    }

    /// Restart timing from `now` so the next frame does not see the idle gap
    pub fn resync(&mut self, now: f64) {
        self.last_time = Some(now);
    }

    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }
}

/// Clamp a raw delta into `(0, MAX_FRAME_DELTA_MS]`
pub fn clamp_delta(raw_ms: f64) -> f32 {
    if raw_ms.is_nan() || raw_ms <= 0.0 {
        REFERENCE_FRAME_MS
    } else {
        (raw_ms as f32).min(MAX_FRAME_DELTA_MS)
    }
}
