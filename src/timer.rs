//! Restartable one-shot deadline.

use embassy_time::{Duration, Instant};

/// A deadline that reports its expiry exactly once
///
/// The timer is polled rather than awaited so it can sit inside a state machine that is
/// driven from a plain loop. [`OneShot::deadline`] exposes the expiry for callers that
/// would rather sleep until it.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    /// Create a stopped timer
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer to fire `duration` after `now`, replacing any pending deadline
    pub fn restart(&mut self, duration: Duration, now: Instant) {
        self.deadline = Some(now + duration);
    }

    /// Disarm without firing
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` on the first poll at or after the deadline, then stops
    pub fn fired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn fires_once_at_deadline() {
        let mut timer = OneShot::new();
        timer.restart(Duration::from_millis(10), at(100));

        assert!(!timer.fired(at(109)));
        assert!(timer.fired(at(110)));
        assert!(!timer.fired(at(111)));
        assert!(!timer.is_running());
    }

    #[test]
    fn restart_moves_deadline() {
        let mut timer = OneShot::new();
        timer.restart(Duration::from_millis(10), at(0));
        timer.restart(Duration::from_millis(10), at(8));

        assert_eq!(timer.deadline(), Some(at(18)));
        assert!(!timer.fired(at(10)));
        assert!(timer.fired(at(18)));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = OneShot::new();
        assert!(!timer.fired(at(1_000)));

        timer.restart(Duration::from_millis(1), at(0));
        timer.stop();
        assert!(!timer.fired(at(1_000)));
    }
}
