//! Frame clock, deadlines, and tweens.
//!
//! `draw_web()` calls at ~60fps with variable delta. FrameClock turns the
//! raw `performance.now()` stamps into a monotonic scene time, so deadlines
//! and fades are computed against one clock and stay fully testable.

use tachyonfx::Interpolation;

pub struct FrameClock {
    /// Scene time in milliseconds since the first frame.
    pub now_ms: f64,
    /// Largest step a single frame may advance the clock by.
    max_step_ms: f64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new(max_step_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            max_step_ms,
            last_timestamp: None,
        }
    }

    /// Feed wall-clock timestamp (from `performance.now()` or similar).
    /// Returns the scene time after this frame.
    pub fn update(&mut self, timestamp_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            // Clamp so a backgrounded tab does not fast-forward every deadline at once
            Some(prev) => (timestamp_ms - prev).clamp(0.0, self.max_step_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        self.now_ms += delta;
        self.now_ms
    }
}

/// Read `performance.now()`. Only meaningful in the browser.
pub fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// A point in scene time after which something gives up waiting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deadline {
    at_ms: f64,
}

impl Deadline {
    pub fn after(now_ms: f64, timeout_ms: f64) -> Self {
        Self {
            at_ms: now_ms + timeout_ms.max(0.0),
        }
    }

    pub fn has_passed(&self, now_ms: f64) -> bool {
        now_ms >= self.at_ms
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.at_ms - now_ms).max(0.0)
    }
}

/// A one-shot value animation from `from` to `to`.
///
/// Nothing waits on a tween: the owner samples it with the current scene
/// time and drops it once it reports finished.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
    start_ms: f64,
    duration_ms: f64,
    from: f32,
    to: f32,
    ease: Interpolation,
}

impl Tween {
    pub fn new(start_ms: f64, duration_ms: f64, from: f32, to: f32, ease: Interpolation) -> Self {
        Self {
            start_ms,
            duration_ms,
            from,
            to,
            ease,
        }
    }

    /// Progress in [0, 1] at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn value(&self, now_ms: f64) -> f32 {
        let t = self.ease.alpha(self.progress(now_ms));
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}
