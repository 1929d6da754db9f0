//! Debounced digital inputs.
//!
//! [`Debounce`] turns a stream of raw boolean samples into a stable value plus a
//! one-cycle change flag. How a raw change is accepted is selected at construction
//! through [`DebouncePolicy`]:
//!
//! - [`DebouncePolicy::Stable`]: the sample must hold for the whole interval; every raw
//!   flip restarts the interval.
//! - [`DebouncePolicy::Lockout`]: a change is accepted immediately, then further changes
//!   are ignored until the interval has passed.
//! - [`DebouncePolicy::Prompt`]: a change is accepted as soon as the input has been quiet
//!   for the interval, without waiting for the new level to settle.
//!
//! [`DebouncedInput`] wraps an [`InputPin`] and feeds its level through a [`Debounce`].

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

use crate::pin::{self, ActiveLevel};

/// How raw sample changes are turned into debounced changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebouncePolicy {
    /// Accept a change once the raw sample has been constant for the full interval
    #[default]
    Stable,
    /// Accept a change at once, then ignore the input for the interval
    Lockout,
    /// Accept a change as soon as the input has been quiet for the interval
    Prompt,
}

/// Debounce timing configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Stabilisation (or lockout) interval
    pub interval: Duration,
    /// Acceptance policy
    pub policy: DebouncePolicy,
}

impl DebounceConfig {
    pub const fn new(interval: Duration, policy: DebouncePolicy) -> Self {
        Self { interval, policy }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            policy: DebouncePolicy::Stable,
        }
    }
}

/// Debounce state machine
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debounce {
    config: DebounceConfig,
    /// Reported value
    debounced: bool,
    /// Last raw sample seen
    unstable: bool,
    /// Set for the single update in which `debounced` flipped
    changed: bool,
    last_transition: Instant,
}

impl Debounce {
    /// Create a debouncer reporting `initial` until the input proves otherwise
    pub fn new(config: DebounceConfig, initial: bool, now: Instant) -> Self {
        let mut debounce = Self {
            config,
            debounced: initial,
            unstable: initial,
            changed: false,
            last_transition: now,
        };
        debounce.reset(initial, now);
        debounce
    }

    /// Force the reported value without flagging a change
    ///
    /// The lockout policy restarts its timer from the epoch so the next change is accepted
    /// immediately; the other policies start counting from `now`.
    pub fn reset(&mut self, value: bool, now: Instant) {
        self.debounced = value;
        self.unstable = value;
        self.changed = false;
        self.last_transition = match self.config.policy {
            DebouncePolicy::Lockout => Instant::from_ticks(0),
            DebouncePolicy::Stable | DebouncePolicy::Prompt => now,
        };
    }

    /// Feed one raw sample taken at `now`
    ///
    /// Returns `true` if the debounced value flipped on this update.
    pub fn update(&mut self, sample: bool, now: Instant) -> bool {
        self.changed = false;
        let elapsed = now.saturating_duration_since(self.last_transition) >= self.config.interval;

        match self.config.policy {
            DebouncePolicy::Stable => {
                if sample != self.unstable {
                    self.unstable = sample;
                    self.last_transition = now;
                } else if elapsed && sample != self.debounced {
                    self.accept(now);
                }
            }
            DebouncePolicy::Lockout => {
                if elapsed && sample != self.debounced {
                    self.accept(now);
                }
            }
            DebouncePolicy::Prompt => {
                if sample != self.debounced && elapsed {
                    self.debounced = sample;
                    self.changed = true;
                }
                // Any raw flip holds off the next change until the input settles
                if sample != self.unstable {
                    self.unstable = sample;
                    self.last_transition = now;
                }
            }
        }

        self.changed
    }

    fn accept(&mut self, now: Instant) {
        self.debounced = !self.debounced;
        self.changed = true;
        self.last_transition = now;
    }

    pub fn value(&self) -> bool {
        self.debounced
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// The value went from `false` to `true` on the last update
    pub fn rose(&self) -> bool {
        self.debounced && self.changed
    }

    /// The value went from `true` to `false` on the last update
    pub fn fell(&self) -> bool {
        !self.debounced && self.changed
    }

    pub fn policy(&self) -> DebouncePolicy {
        self.config.policy
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

/// An input pin read through a [`Debounce`]
///
/// The reported value is logical: `true` means the line is at its active level, so an
/// active-low button reads `true` while pressed.
pub struct DebouncedInput<P> {
    pin: P,
    level: ActiveLevel,
    debounce: Debounce,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Wrap `pin`, seeding the debouncer with its current level
    pub fn new(mut pin: P, level: ActiveLevel, config: DebounceConfig, now: Instant) -> Result<Self, P::Error> {
        let initial = pin::sample(&mut pin, level)?;
        Ok(Self {
            pin,
            level,
            debounce: Debounce::new(config, initial, now),
        })
    }

    /// Sample the pin and update the debounced value
    ///
    /// Returns `true` if the debounced value changed.
    pub fn poll(&mut self, now: Instant) -> Result<bool, P::Error> {
        let sample = pin::sample(&mut self.pin, self.level)?;
        Ok(self.debounce.update(sample, now))
    }

    pub fn value(&self) -> bool {
        self.debounce.value()
    }

    pub fn changed(&self) -> bool {
        self.debounce.changed()
    }

    pub fn rose(&self) -> bool {
        self.debounce.rose()
    }

    pub fn fell(&self) -> bool {
        self.debounce.fell()
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

    const INTERVAL_MS: u64 = 10;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn debouncer(policy: DebouncePolicy, now: u64) -> Debounce {
        Debounce::new(
            DebounceConfig::new(Duration::from_millis(INTERVAL_MS), policy),
            false,
            at(now),
        )
    }

    #[test]
    fn stable_ignores_short_glitch() {
        let mut d = debouncer(DebouncePolicy::Stable, 0);

        for ms in 20..25 {
            assert!(!d.update(true, at(ms)));
        }
        for ms in 25..60 {
            assert!(!d.update(false, at(ms)));
        }
        assert!(!d.value());
    }

    #[test]
    fn stable_flips_once_after_interval() {
        let mut d = debouncer(DebouncePolicy::Stable, 0);

        let mut changes = 0;
        for ms in 20..60 {
            if d.update(true, at(ms)) {
                changes += 1;
                assert_eq!(ms, 20 + INTERVAL_MS);
                assert!(d.changed());
                assert!(d.rose());
            } else {
                assert!(!d.changed());
            }
        }
        assert_eq!(changes, 1);
        assert!(d.value());
    }

    #[test]
    fn stable_glitch_restarts_interval() {
        let mut d = debouncer(DebouncePolicy::Stable, 0);

        d.update(true, at(20));
        d.update(false, at(25));
        d.update(true, at(27));
        assert!(!d.update(true, at(30)));
        assert!(!d.update(true, at(36)));
        assert!(d.update(true, at(37)));
    }

    #[test]
    fn stable_does_not_report_initial_value() {
        let mut d = Debounce::new(DebounceConfig::default(), true, at(0));

        for ms in 0..50 {
            assert!(!d.update(true, at(ms)));
        }
        assert!(d.value());
    }

    #[test]
    fn lockout_accepts_first_change_immediately() {
        let mut d = debouncer(DebouncePolicy::Lockout, 100);

        assert!(d.update(true, at(100)));
        assert!(d.rose());
    }

    #[test]
    fn lockout_ignores_changes_inside_window() {
        let mut d = debouncer(DebouncePolicy::Lockout, 100);
        assert!(d.update(true, at(100)));

        for ms in 101..110 {
            assert!(!d.update(false, at(ms)));
            assert!(d.value());
        }
        assert!(d.update(false, at(110)));
        assert!(d.fell());
    }

    #[test]
    fn lockout_does_not_need_stable_input() {
        let mut d = debouncer(DebouncePolicy::Lockout, 0);
        assert!(d.update(true, at(50)));

        // Bouncing right up to the window edge does not delay the next change
        for ms in 51..60 {
            d.update(ms % 2 == 0, at(ms));
        }
        assert!(d.update(false, at(60)));
    }

    #[test]
    fn prompt_rejects_fast_toggling() {
        let mut d = debouncer(DebouncePolicy::Prompt, 0);

        let half = INTERVAL_MS / 2;
        let mut sample = false;
        for step in 1..40 {
            sample = !sample;
            assert!(!d.update(sample, at(step * half)));
        }
        assert!(!d.value());
    }

    #[test]
    fn prompt_accepts_once_input_settles() {
        let mut d = debouncer(DebouncePolicy::Prompt, 0);

        let half = INTERVAL_MS / 2;
        let mut sample = false;
        for step in 1..=9 {
            sample = !sample;
            d.update(sample, at(step * half));
        }
        // Last toggle left the input high at 45ms
        assert!(sample);
        assert!(!d.update(true, at(50)));
        assert!(d.update(true, at(55)));
        assert!(d.rose());
        assert!(!d.update(true, at(56)));
    }

    #[test]
    fn prompt_change_is_immediate_after_quiet_period() {
        let mut d = debouncer(DebouncePolicy::Prompt, 0);

        assert!(d.update(true, at(100)));
        // Still bouncing: the flip restarted the timer
        assert!(!d.update(false, at(101)));
        assert!(!d.update(false, at(110)));
        assert!(d.update(false, at(111)));
        assert!(d.fell());
    }

    #[test]
    fn reset_forces_value_without_change() {
        let mut d = debouncer(DebouncePolicy::Stable, 0);
        d.reset(true, at(5));

        assert!(d.value());
        assert!(!d.changed());
        assert!(!d.update(true, at(100)));
    }

    #[test]
    fn input_maps_active_low_to_pressed() {
        let expectations = [
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
        ];
        let pin = PinMock::new(&expectations);
        let config = DebounceConfig::new(Duration::from_millis(INTERVAL_MS), DebouncePolicy::Stable);

        let mut input = DebouncedInput::new(pin, ActiveLevel::Low, config, at(0)).unwrap();
        assert!(!input.value());

        assert!(!input.poll(at(1)).unwrap());
        assert!(!input.poll(at(5)).unwrap());
        assert!(input.poll(at(11)).unwrap());
        assert!(input.value());
        assert!(input.rose());

        input.release().done();
    }
}
