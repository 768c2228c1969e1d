// wayfinder_core/src/engine/throttle.rs

use std::time::Duration;

/// Lets an action run at most once per `min_interval` of host clock time.
///
/// The clock is whatever the host passes in as `now` (time since session start),
/// so behaviour is fully deterministic under a simulated clock.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_fired: Option<Duration>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fired: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// True if firing at `now` would be allowed. A clock that runs backwards
    /// never re-opens the window.
    pub fn ready(&self, now: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.min_interval,
        }
    }

    /// Fires if allowed, recording `now` as the last firing time.
    pub fn try_fire(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }

    /// Earliest time the next firing is allowed.
    pub fn next_allowed(&self) -> Duration {
        self.last_fired
            .map_or(Duration::ZERO, |last| last + self.min_interval)
    }
}
