//! Simulation clock.
//!
//! The clock is the single source of truth for the global time `t` that drives
//! the sway of every vortex column. It only moves forward, and one value is
//! shared by all particles of all vortices within a tick.
//!
//! # Example
//!
//! ```
//! use twister::time::Clock;
//!
//! let mut clock = Clock::new();
//! clock.set_fixed_delta(Some(1.0 / 60.0));
//!
//! let (elapsed, delta) = clock.advance(0.5); // fixed delta wins
//! assert_eq!(clock.frame(), 1);
//! assert!((delta - 1.0 / 60.0).abs() < 1e-12);
//! assert_eq!(elapsed, delta);
//! ```

use std::time::Instant;

/// Monotonic simulation clock.
///
/// Time is advanced either by an externally supplied step ([`Clock::advance`])
/// or by wall time ([`Clock::update`]). Pausing freezes it, and a time scale
/// stretches every step.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Total simulated time.
    elapsed: f64,
    /// Length of the last step.
    delta: f64,
    /// Steps taken since start.
    frame_count: u64,
    /// Whether time is paused.
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f64>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f64,
    /// Wall-clock instant of the last [`Clock::update`].
    last_wall: Option<Instant>,
}

impl Clock {
    /// Create a clock at `t = 0`.
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            last_wall: None,
        }
    }

    /// Advance by `dt` (or the fixed delta when set). Returns `(elapsed, delta)`.
    ///
    /// Negative or non-finite steps are treated as zero so the clock never
    /// runs backwards.
    pub fn advance(&mut self, dt: f64) -> (f64, f64) {
        if self.paused {
            self.delta = 0.0;
            return (self.elapsed, self.delta);
        }

        let raw = self.fixed_delta.unwrap_or(dt);
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        self.delta = raw * self.time_scale;
        self.elapsed += self.delta;
        self.frame_count += 1;

        (self.elapsed, self.delta)
    }

    /// Advance by the wall time since the previous call.
    ///
    /// The first call only records the starting instant and advances by zero.
    pub fn update(&mut self) -> (f64, f64) {
        let now = Instant::now();
        let dt = match self.last_wall {
            Some(last) => now.duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_wall = Some(now);
        self.advance(dt)
    }

    /// Total simulated time.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Length of the last step.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Steps taken since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Whether time is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current time scale multiplier.
    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Pause time progression.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after pausing. Wall time spent paused is not simulated.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if self.last_wall.is_some() {
                self.last_wall = Some(Instant::now());
            }
        }
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use the supplied or wall-clock step.
    pub fn set_fixed_delta(&mut self, delta: Option<f64>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
