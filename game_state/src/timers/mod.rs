//! Named in-game timers: deferred completion keyed to the calendar clock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::clock::GameClock;

/// A single named timer: a start point on the clock plus a duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub start_day: u32,
    pub start_hour: f32,
    pub duration_hours: f32,
}

impl Timer {
    /// Whether the timer has run its full duration as of `clock`.
    pub fn is_complete(&self, clock: &GameClock) -> bool {
        let start = GameClock::new(self.start_day, self.start_hour);
        clock.hours_since(&start) >= self.duration_hours
    }
}

/// Registry of active named timers.
///
/// Timers are never removed implicitly. A dialogue branch typically checks
/// "waiting" vs. "ready" by querying the same timer repeatedly, so
/// completion checks must be idempotent; removal is an explicit call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimerRegistry {
    timers: HashMap<String, Timer>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a named timer at the given clock reading.
    pub fn start(&mut self, id: impl Into<String>, clock: &GameClock, duration_hours: f32) {
        self.timers.insert(
            id.into(),
            Timer {
                start_day: clock.day,
                start_hour: clock.hour,
                duration_hours,
            },
        );
    }

    /// Whether the named timer exists and has completed as of `clock`.
    ///
    /// A timer that was never started reads as incomplete.
    pub fn is_complete(&self, id: &str, clock: &GameClock) -> bool {
        self.timers.get(id).is_some_and(|t| t.is_complete(clock))
    }

    /// Whether a timer with this id has ever been started.
    pub fn contains(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the timer record for an id.
    pub fn get(&self, id: &str) -> Option<&Timer> {
        self.timers.get(id)
    }

    /// Explicitly drop a timer. The engine never calls this on its own.
    pub fn remove(&mut self, id: &str) -> Option<Timer> {
        self.timers.remove(id)
    }

    /// Number of timers ever started and not removed.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether the registry holds no timers.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_timer_is_incomplete() {
        let registry = TimerRegistry::new();
        let clock = GameClock::new(10, 12.0);
        assert!(!registry.is_complete("never_started", &clock));
    }

    #[test]
    fn test_timer_completes_after_duration() {
        let mut registry = TimerRegistry::new();
        let mut clock = GameClock::new(1, 20.0);
        registry.start("brew_potion", &clock, 6.0);

        assert!(!registry.is_complete("brew_potion", &clock));

        clock.advance(5.0);
        assert!(!registry.is_complete("brew_potion", &clock));

        clock.advance(1.0);
        assert!(registry.is_complete("brew_potion", &clock));
    }

    #[test]
    fn test_completion_check_is_idempotent() {
        let mut registry = TimerRegistry::new();
        let mut clock = GameClock::new(1, 0.0);
        registry.start("siege", &clock, 24.0);
        clock.advance(30.0);

        assert!(registry.is_complete("siege", &clock));
        assert!(registry.is_complete("siege", &clock));
        assert!(registry.contains("siege"));
    }

    #[test]
    fn test_restart_overwrites() {
        let mut registry = TimerRegistry::new();
        let mut clock = GameClock::new(1, 0.0);
        registry.start("ferry", &clock, 2.0);
        clock.advance(3.0);
        assert!(registry.is_complete("ferry", &clock));

        registry.start("ferry", &clock, 2.0);
        assert!(!registry.is_complete("ferry", &clock));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_explicit_remove() {
        let mut registry = TimerRegistry::new();
        let clock = GameClock::new(1, 0.0);
        registry.start("curse", &clock, 1.0);

        assert!(registry.remove("curse").is_some());
        assert!(registry.is_empty());
        assert!(!registry.is_complete("curse", &clock));
    }
}
