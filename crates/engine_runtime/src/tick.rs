//! Fixed-rate tick scheduling.

use std::time::{Duration, Instant};

use tracing::warn;

/// Slowest accepted tick rate: one tick every 100 seconds.
pub const MIN_TICK_RATE: f64 = 0.01;

/// Fastest accepted tick rate.
pub const MAX_TICK_RATE: f64 = 10_000.0;

const DEFAULT_TICK_RATE: f64 = 60.0;

/// Configuration for the tick loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_ticks: 0,
        }
    }
}

impl TickConfig {
    /// Whether `tick_rate` lies within [`MIN_TICK_RATE`]..=[`MAX_TICK_RATE`].
    #[must_use]
    pub fn is_valid_rate(tick_rate: f64) -> bool {
        (MIN_TICK_RATE..=MAX_TICK_RATE).contains(&tick_rate)
    }

    /// Time budget of one tick. Out-of-range rates are clamped into the
    /// accepted range; NaN falls back to the default rate.
    #[must_use]
    pub fn interval(&self) -> Duration {
        let rate = if self.tick_rate.is_nan() {
            DEFAULT_TICK_RATE
        } else {
            self.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE)
        };
        Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::from_secs(100))
    }

    /// Whether `ticks` completed ticks exhaust the configured limit.
    #[must_use]
    pub fn is_done(&self, ticks: u64) -> bool {
        self.max_ticks > 0 && ticks >= self.max_ticks
    }
}

/// Tracks when the next tick is due.
///
/// The first tick is due immediately. After each tick the deadline moves one
/// interval forward; if the loop has fallen more than a whole interval
/// behind, the deadline is reset to `now + interval` instead of bursting to
/// catch up.
#[derive(Debug, Clone)]
pub struct TickClock {
    interval: Duration,
    next_due: Instant,
}

impl TickClock {
    #[must_use]
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// How long to wait for the next tick; zero if it is already due.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Record that tick `tick` ran at `now` and schedule the next one.
    pub fn mark(&mut self, tick: u64, now: Instant) {
        let late_by = now.saturating_duration_since(self.next_due);
        if late_by > self.interval {
            warn!(
                tick,
                late_ms = late_by.as_millis() as u64,
                budget_ms = self.interval.as_millis() as u64,
                "tick exceeded time budget"
            );
            self.next_due = now + self.interval;
        } else {
            self.next_due += self.interval;
        }
    }
}
