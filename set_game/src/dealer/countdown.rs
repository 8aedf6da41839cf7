//! Round countdown and its display cadence.

use std::time::Duration;
use tokio::time::Instant;

/// Display refresh period outside the warning threshold.
pub const COARSE_TICK: Duration = Duration::from_secs(1);

/// Reshuffle deadline plus the schedule of display refreshes.
///
/// Refreshes are due every [`COARSE_TICK`] until the remaining time drops
/// under the warning threshold, then every `warning_tick`. The next refresh
/// is scheduled from the previous one, so waking up early for a claim does
/// not shift the display.
#[derive(Debug, Clone)]
pub struct Countdown {
    turn_timeout: Option<Duration>,
    warning: Duration,
    warning_tick: Duration,
    deadline: Option<Instant>,
    next_update: Option<Instant>,
}

impl Countdown {
    /// A countdown that has not started. `turn_timeout` of `None` never
    /// expires and never needs a refresh.
    pub fn new(turn_timeout: Option<Duration>, warning: Duration, warning_tick: Duration) -> Self {
        Self {
            turn_timeout,
            warning,
            warning_tick,
            deadline: None,
            next_update: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.turn_timeout.is_some()
    }

    /// Restart the round at `now`. Returns the value to display.
    pub fn reset(&mut self, now: Instant) -> Option<(Duration, bool)> {
        let timeout = self.turn_timeout?;
        let warn = timeout <= self.warning;
        let deadline = now + timeout;
        self.deadline = Some(deadline);
        self.next_update = Some(self.clamp_to_warning(now + self.tick_for(warn), deadline, warn));
        Some((timeout, warn))
    }

    /// The value to display if a refresh is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<(Duration, bool)> {
        let deadline = self.deadline?;
        let mut next = self.next_update?;
        if next > now {
            return None;
        }
        let remaining = deadline.saturating_duration_since(now);
        let warn = remaining <= self.warning;
        let step = self.tick_for(warn);
        while next <= now {
            next += step;
        }
        self.next_update = Some(self.clamp_to_warning(next, deadline, warn));
        Some((remaining, warn))
    }

    /// When the dealer must wake up next, if ever.
    pub fn next_wake(&self) -> Option<Instant> {
        match (self.next_update, self.deadline) {
            (Some(update), Some(deadline)) => Some(update.min(deadline)),
            (update, deadline) => update.or(deadline),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn tick_for(&self, warn: bool) -> Duration {
        if warn { self.warning_tick } else { COARSE_TICK }
    }

    /// Coarse refreshes must not skip the start of the warning threshold.
    fn clamp_to_warning(&self, next: Instant, deadline: Instant, warn: bool) -> Instant {
        if warn {
            return next;
        }
        match deadline.checked_sub(self.warning) {
            Some(warning_start) => next.min(warning_start),
            None => next,
        }
    }
}
