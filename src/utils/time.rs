use std::time::{Duration, Instant};

use smallvec::SmallVec;

/// Identifier of a periodic callback registered with the host.
pub type TimerId = &'static str;

#[derive(Debug, Clone)]
struct RegisteredTimer {
    id: TimerId,
    interval: Duration,
    next_due: Instant,
}

/// Host-side table of periodic callbacks.
///
/// The host polls it from its event loop and invokes whatever is due. A
/// callback may change its own interval or unregister itself through the
/// value it returns to [`TimerRegistry::reschedule`].
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: SmallVec<[RegisteredTimer; 4]>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a timer first firing `interval` after `now`. Returns `false`
    /// and leaves the registry untouched if `id` is already registered.
    pub fn register(&mut self, id: TimerId, interval: Duration, now: Instant) -> bool {
        if self.is_registered(id) {
            return false;
        }
        self.timers.push(RegisteredTimer {
            id,
            interval,
            next_due: now + interval,
        });
        true
    }

    pub fn unregister(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    #[must_use]
    pub fn is_registered(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Returns the timers due at `now`.
    #[must_use]
    pub fn poll_due(&self, now: Instant) -> SmallVec<[TimerId; 4]> {
        self.timers
            .iter()
            .filter(|t| t.next_due <= now)
            .map(|t| t.id)
            .collect()
    }

    /// Applies a callback's return value: `Some(interval)` schedules the next
    /// call, `None` unregisters the timer.
    pub fn reschedule(&mut self, id: TimerId, next: Option<Duration>, now: Instant) {
        match next {
            Some(interval) => {
                if let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) {
                    timer.interval = interval;
                    timer.next_due = now + interval;
                }
            }
            None => {
                self.unregister(id);
            }
        }
    }

    #[must_use]
    pub fn interval(&self, id: TimerId) -> Option<Duration> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.interval)
    }
}
