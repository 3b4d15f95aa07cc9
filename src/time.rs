//! Clocks that drive the per-frame tick.
//!
//! The scheduler works on absolute timestamps in seconds. A host either
//! passes its own frame time to [`EffectScheduler::tick`](crate::EffectScheduler::tick)
//! or uses one of the [`Clock`] implementations here:
//!
//! - [`FrameClock`] - wall-clock time from `std::time::Instant`, with pause
//!   and time scale.
//! - [`ManualClock`] - time advanced explicitly, for tests and offline runs.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // In your frame callback:
//! clock.update();
//! scheduler.tick(clock.now());
//! ```

use std::time::{Duration, Instant};

/// A source of simulation time.
pub trait Clock {
    /// Seconds since the clock started.
    fn now(&self) -> f32;
}

/// Wall-clock time for a frame loop.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    /// Total time spent paused, excluded from `now()`.
    pause_elapsed: Duration,
    time_scale: f32,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            pause_elapsed: Duration::ZERO,
            time_scale: 1.0,
        }
    }

    /// Sample the wall clock. Call once per frame.
    ///
    /// Returns `(now, delta)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32() * self.time_scale;
        self.last_frame = now;

        let raw_elapsed = now.duration_since(self.start).saturating_sub(self.pause_elapsed);
        self.elapsed_secs = raw_elapsed.as_secs_f32() * self.time_scale;
        self.frame_count += 1;

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds between the last two updates, scaled.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames sampled so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Whether the clock is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time. `now()` holds and `delta()` is 0 until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restart time after a pause.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    /// Time scale multiplier (1.0 = real time). Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Current time scale.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f32 {
        self.elapsed_secs
    }
}

/// Clock advanced by hand.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: f32,
    delta: f32,
}

impl ManualClock {
    /// Clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.delta = dt;
        self.now += dt;
        self.now
    }

    /// Jump to an absolute time.
    pub fn set(&mut self, now: f32) {
        self.delta = now - self.now;
        self.now = now;
    }

    /// Size of the last step.
    pub fn delta(&self) -> f32 {
        self.delta
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.now
    }
}
