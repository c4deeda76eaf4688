//! Eased transitions advanced once per render tick.
//!
//! A transition never drives itself: the host calls `sample(now)` from its
//! frame callback until `is_finished(now)` reports completion, or drops the
//! transition to cancel it.

use std::time::{Duration, Instant};

/// Cubic ease-in-out over `t` in [0, 1].
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    fn lerp(&self, to: &Self, t: f32) -> Self;
}

#[derive(Clone, Debug)]
pub struct Transition<T: Lerp> {
    from: T,
    to: T,
    started_at: Instant,
    duration: Duration,
    easing: fn(f32) -> f32,
}

impl<T: Lerp> Transition<T> {
    pub fn new(from: T, to: T, started_at: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            easing: ease_in_out_cubic,
        }
    }

    pub fn with_easing(mut self, easing: fn(f32) -> f32) -> Self {
        self.easing = easing;
        self
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Instant) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, (self.easing)(p))
    }
}
