//! Divider animation
//!
//! Entering a split can slide the divider to the middle. The animation is a
//! pure function of time; the window advances it from its tick.

use std::time::{Duration, Instant};

/// Default divider animation length.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(250);

/// A running divider animation with cubic ease-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerAnimation {
    from: f64,
    to: f64,
    started_at: Instant,
    duration: Duration,
}

impl DividerAnimation {
    /// Starts an animation from `from` to `to`.
    #[must_use]
    pub const fn new(from: f64, to: f64, started_at: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// Target fraction.
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.to
    }

    /// Returns true once `now` is past the end of the animation.
    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    /// Fraction at `now`.
    #[must_use]
    pub fn value_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        let t = (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.to - self.from).mul_add(eased, self.from)
    }
}
