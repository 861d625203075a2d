use chrono::Duration;

/// Configuration for the attempt tracker.
///
/// Loaded once at startup and passed by value into the gate; there are no
/// process-wide mutable settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Consecutive failures allowed before refusal. Zero refuses from the
    /// first recorded failure onward.
    pub failure_threshold: u32,

    /// How long refusal lasts after the most recent failure. A zero window
    /// disables time-based auto-clear: a refused user stays refused until a
    /// successful login.
    pub refusal_window: Duration,
}

impl ThrottleConfig {
    pub fn new(failure_threshold: u32, refusal_window: Duration) -> Self {
        Self {
            failure_threshold,
            refusal_window,
        }
    }

    /// Build a config from a window expressed in whole minutes, the unit the
    /// host exposes to operators.
    pub fn from_minutes(failure_threshold: u32, refusal_window_minutes: u32) -> Self {
        Self::new(
            failure_threshold,
            Duration::minutes(i64::from(refusal_window_minutes)),
        )
    }

    /// Whether the refusal window never expires on its own.
    pub fn is_window_indefinite(&self) -> bool {
        self.refusal_window.is_zero()
    }

    /// Whether a record whose last failure is `elapsed` old has gone stale.
    ///
    /// Absence of a record is treated as "last failure infinitely long ago",
    /// so callers never ask about missing records.
    pub fn window_expired(&self, elapsed: Duration) -> bool {
        !self.is_window_indefinite() && elapsed >= self.refusal_window
    }

    /// The retry-after hint surfaced on refusal, `None` when indefinite.
    pub fn retry_after(&self) -> Option<Duration> {
        if self.is_window_indefinite() {
            None
        } else {
            Some(self.refusal_window)
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 0,
            refusal_window: Duration::zero(),
        }
    }
}
