//! Non-blocking beeper.
//!
//! The beeper drives a single output line to its active level for a fixed duration. It
//! never sleeps: [`Beeper::beep`] switches the line on and arms a [`OneShot`], and
//! [`Beeper::poll`] switches it off again once the deadline has passed.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;

use crate::pin::{self, ActiveLevel};
use crate::timer::OneShot;

/// Beeper configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeeperConfig {
    /// Length of a [`Beeper::beep`]
    pub default_duration: Duration,
    /// Level that sounds the beeper
    pub active: ActiveLevel,
}

impl Default for BeeperConfig {
    fn default() -> Self {
        Self {
            default_duration: Duration::from_millis(10),
            active: ActiveLevel::Low,
        }
    }
}

/// Single-shot beeper on an output pin
pub struct Beeper<P> {
    pin: P,
    config: BeeperConfig,
    off: OneShot,
}

impl<P: OutputPin> Beeper<P> {
    /// Take ownership of `pin` and drive it idle
    pub fn new(pin: P, config: BeeperConfig) -> Result<Self, P::Error> {
        let mut beeper = Self {
            pin,
            config,
            off: OneShot::new(),
        };
        beeper.reset()?;
        Ok(beeper)
    }

    /// Silence the beeper and cancel any pending beep
    pub fn reset(&mut self) -> Result<(), P::Error> {
        self.off.stop();
        pin::drive(&mut self.pin, self.config.active, false)
    }

    /// Beep for the configured default duration
    pub fn beep(&mut self, now: Instant) -> Result<(), P::Error> {
        self.beep_for(self.config.default_duration, now)
    }

    /// Switch the beeper on for `duration`
    ///
    /// Calling this while a beep is already sounding restarts the timer from `now`.
    pub fn beep_for(&mut self, duration: Duration, now: Instant) -> Result<(), P::Error> {
        pin::drive(&mut self.pin, self.config.active, true)?;
        self.off.restart(duration, now);
        Ok(())
    }

    /// Switch the beeper off if its duration has elapsed
    ///
    /// Must be called frequently; the line is released exactly once per beep.
    pub fn poll(&mut self, now: Instant) -> Result<(), P::Error> {
        if self.off.fired(now) {
            pin::drive(&mut self.pin, self.config.active, false)?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.off.is_running()
    }

    /// When the current beep ends, if one is sounding
    pub fn deadline(&self) -> Option<Instant> {
        self.off.deadline()
    }

    /// Release the underlying pin
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn beep_holds_line_until_duration_elapses() {
        let expectations = [
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let pin = PinMock::new(&expectations);

        let mut beeper = Beeper::new(pin, BeeperConfig::default()).unwrap();
        beeper.beep_for(Duration::from_millis(50), at(0)).unwrap();
        assert!(beeper.is_active());

        beeper.poll(at(10)).unwrap();
        beeper.poll(at(49)).unwrap();
        assert!(beeper.is_active());

        beeper.poll(at(50)).unwrap();
        assert!(!beeper.is_active());

        // Further polls leave the line alone
        beeper.poll(at(60)).unwrap();
        beeper.poll(at(500)).unwrap();

        beeper.release().done();
    }

    #[test]
    fn beep_while_active_restarts_timer() {
        let expectations = [
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let pin = PinMock::new(&expectations);

        let mut beeper = Beeper::new(pin, BeeperConfig::default()).unwrap();
        beeper.beep(at(0)).unwrap();
        beeper.beep(at(8)).unwrap();
        assert_eq!(beeper.deadline(), Some(at(18)));

        beeper.poll(at(10)).unwrap();
        assert!(beeper.is_active());
        beeper.poll(at(18)).unwrap();
        assert!(!beeper.is_active());

        beeper.release().done();
    }

    #[test]
    fn reset_silences_pending_beep() {
        let expectations = [
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let pin = PinMock::new(&expectations);

        let mut beeper = Beeper::new(pin, BeeperConfig::default()).unwrap();
        beeper.beep(at(0)).unwrap();
        beeper.reset().unwrap();
        assert!(!beeper.is_active());

        beeper.poll(at(100)).unwrap();

        beeper.release().done();
    }

    #[test]
    fn active_high_beeper() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ];
        let pin = PinMock::new(&expectations);
        let config = BeeperConfig {
            active: ActiveLevel::High,
            ..BeeperConfig::default()
        };

        let mut beeper = Beeper::new(pin, config).unwrap();
        beeper.beep(at(0)).unwrap();
        beeper.poll(at(10)).unwrap();

        beeper.release().done();
    }
}
