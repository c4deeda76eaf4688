//! Frame timing and scoped timers for the engine's hot paths.
//!
//! `FrameStats` is fed by `Workspace::tick` with the host's frame instants.
//! `profile_scope!` wraps hit-testing, projection, and history capture; it
//! compiles to nothing unless the `profiling` feature is enabled:
//!
//! ```toml
//! canvasflow = { features = ["profiling"] }
//! ```
//!
//! ```ignore
//! fn resolve() {
//!     profile_scope!("resolve_pointer_target");
//! }
//! ```

use crate::constants::TARGET_FRAME_MS;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::trace;

/// Frame intervals kept for the rolling window (one second at 60 Hz)
const WINDOW_FRAMES: usize = 60;

/// A frame counts as slow past this multiple of the frame budget
const SLOW_FRAME_FACTOR: f64 = 2.0;

/// Scopes timed by `profile_scope!` report past this many milliseconds
const PROFILE_SCOPE_MS: f64 = 1.0;

static PROFILING_ENABLED: AtomicBool = AtomicBool::new(cfg!(feature = "profiling"));

// ============================================================================
// Profiling Macros
// ============================================================================

/// Time the enclosing scope. Expands to nothing without the `profiling`
/// feature; the optional second argument overrides the report threshold.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _scope_timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _scope_timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

/// Toggle scope reports at runtime. Without the `profiling` feature there
/// are no scopes to report, so this only affects profiling builds.
pub fn set_profiling_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

// ============================================================================
// Frame Statistics
// ============================================================================

/// Rolling window over the intervals between frame ticks.
#[derive(Debug)]
pub struct FrameStats {
    window: VecDeque<f64>,
    last_tick: Option<Instant>,
    budget_ms: f64,
    total_frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::with_budget(TARGET_FRAME_MS)
    }

    /// Stats measured against a custom frame budget in milliseconds.
    pub fn with_budget(budget_ms: f64) -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_FRAMES),
            last_tick: None,
            budget_ms,
            total_frames: 0,
        }
    }

    /// Record a frame at `now`. The first tick after creation or `pause`
    /// only sets the reference point and returns `None`; later ticks return
    /// the interval in milliseconds.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let previous = self.last_tick.replace(now)?;
        let ms = as_ms(now.saturating_duration_since(previous));
        self.record_frame(ms);
        Some(ms)
    }

    pub fn record_frame(&mut self, ms: f64) {
        if self.window.len() == WINDOW_FRAMES {
            self.window.pop_front();
        }
        self.window.push_back(ms);
        self.total_frames += 1;

        #[cfg(feature = "profiling")]
        if self.is_slow(ms) {
            trace!(frame_ms = ms, budget_ms = self.budget_ms, "Slow frame");
        }
    }

    /// Forget the reference tick so an idle gap is not counted as a frame.
    pub fn pause(&mut self) {
        self.last_tick = None;
    }

    fn is_slow(&self, ms: f64) -> bool {
        ms > self.budget_ms * SLOW_FRAME_FACTOR
    }

    pub fn average_frame_time(&self) -> f64 {
        match self.window.len() {
            0 => 0.0,
            n => self.window.iter().sum::<f64>() / n as f64,
        }
    }

    pub fn max_frame_time(&self) -> f64 {
        self.window.iter().fold(0.0, |max, &ms| max.max(ms))
    }

    /// Share of slow frames in the current window, as a percentage.
    pub fn slow_frame_percentage(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let slow = self.window.iter().filter(|&&ms| self.is_slow(ms)).count();
        slow as f64 * 100.0 / self.window.len() as f64
    }

    pub fn estimated_fps(&self) -> f64 {
        let avg = self.average_frame_time();
        if avg > 0.0 { 1000.0 / avg } else { 0.0 }
    }

    /// Frames recorded since creation, including ones that left the window.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Warn once if the window's average misses the frame budget.
    pub fn log_summary_if_slow(&self) {
        let avg = self.average_frame_time();
        if avg <= self.budget_ms {
            return;
        }
        warn!(
            avg_frame_ms = avg,
            max_frame_ms = self.max_frame_time(),
            slow_percent = self.slow_frame_percentage(),
            fps = self.estimated_fps(),
            "Canvas frame rate below target"
        );
    }
}

// ============================================================================
// Scoped Timer
// ============================================================================

/// Reports its lifetime on drop when it exceeds the threshold. Profiling
/// builds trace every report; other builds warn.
pub struct ScopedTimer {
    name: &'static str,
    started: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            started: Instant::now(),
            threshold_ms,
        }
    }

    /// Threshold of one frame budget.
    pub fn with_default_threshold(name: &'static str) -> Self {
        Self::new(name, TARGET_FRAME_MS)
    }

    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, PROFILE_SCOPE_MS)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = as_ms(self.started.elapsed());
        if elapsed_ms <= self.threshold_ms {
            return;
        }

        #[cfg(feature = "profiling")]
        if is_profiling_enabled() {
            trace!(scope = self.name, elapsed_ms, "[PERF]");
        }

        #[cfg(not(feature = "profiling"))]
        warn!(
            operation = self.name,
            elapsed_ms,
            threshold_ms = self.threshold_ms,
            "Slow canvas operation"
        );
    }
}

/// Run `f`, returning its result and the elapsed milliseconds.
#[inline]
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let started = Instant::now();
    let result = f();
    (result, as_ms(started.elapsed()))
}
