//! HC-SR04 style ultrasonic ranger.
//!
//! A measurement has two halves running in different contexts:
//! - an edge handler (interrupt, or a task awaiting the echo line) timestamps the echo
//!   pulse into an [`EchoCapture`]
//! - [`Ultrasonic::update`], called from the main loop, fires the trigger pulse, collects
//!   finished echoes from the capture and converts them into a [`Distance`]
//!
//! Sound covers roughly 340 mm per millisecond and the echo spans the round trip, so one
//! millisecond of echo is 170 mm of range.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Millimetres of range per millisecond of echo
const ROUND_TRIP_MM_PER_MS: u64 = 170;

/// Time from the trigger to the start of the echo, allowed on top of the echo itself
const ECHO_START_ALLOWANCE: Duration = Duration::from_millis(2);

/// Low time before the trigger pulse so the sensor sees a clean rising edge
const TRIGGER_SETUP_US: u32 = 4;

// Capture phases
const IDLE: u8 = 0;
const ARMED: u8 = 1;
const ROSE: u8 = 2;
const FELL: u8 = 3;

/// Range to an obstacle, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance(u32);

impl Distance {
    pub const fn from_mm(mm: u32) -> Self {
        Self(mm)
    }

    pub const fn mm(self) -> u32 {
        self.0
    }

    pub const fn cm(self) -> u32 {
        self.0 / 10
    }

    /// Range corresponding to an echo pulse of the given width
    pub fn from_echo(echo: Duration) -> Self {
        let mm = echo.as_micros() * ROUND_TRIP_MM_PER_MS / 1000;
        Self(u32::try_from(mm).unwrap_or(u32::MAX))
    }

    /// Echo pulse width expected for an obstacle at this range
    pub fn echo_duration(self) -> Duration {
        Duration::from_micros(u64::from(self.0) * 1000 / ROUND_TRIP_MM_PER_MS)
    }
}

/// Wrapping microsecond timestamp, the width the capture can store atomically
fn micros(now: Instant) -> u32 {
    now.as_micros() as u32
}

/// A complete echo pulse as captured by the edge handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoPulse {
    /// Rising edge, wrapping microseconds
    pub rise: u32,
    /// Falling edge, wrapping microseconds
    pub fall: u32,
}

impl EchoPulse {
    pub fn duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.fall.wrapping_sub(self.rise)))
    }
}

/// Echo timestamps handed from the edge handler to the ranger
///
/// Single producer, single consumer. The edge handler only writes timestamps and moves
/// the phase forward (`Armed → Rose → Fell`) with compare-and-swap; the ranger only arms,
/// disarms and reads. Each timestamp is stored before the phase that publishes it, so
/// observing a phase with `Acquire` makes its timestamps visible. Edges outside an armed
/// measurement are ignored.
///
/// The edge handler must not be preempted by the ranger (true for an interrupt handler on a
/// single core, and for a task on the same executor).
///
/// One capture serves one sensor; give every sensor its own.
pub struct EchoCapture {
    rise: AtomicU32,
    fall: AtomicU32,
    phase: AtomicU8,
}

impl EchoCapture {
    pub const fn new() -> Self {
        Self {
            rise: AtomicU32::new(0),
            fall: AtomicU32::new(0),
            phase: AtomicU8::new(IDLE),
        }
    }

    /// Record the echo line going high
    ///
    /// Only the first rising edge after [`EchoCapture::arm`] is kept.
    pub fn record_rise(&self, now: Instant) {
        if self.phase.load(Ordering::Acquire) == ARMED {
            self.rise.store(micros(now), Ordering::Relaxed);
            let _ = self
                .phase
                .compare_exchange(ARMED, ROSE, Ordering::Release, Ordering::Relaxed);
        }
    }

    /// Record the echo line going low
    ///
    /// Only the first falling edge after a recorded rise is kept.
    pub fn record_fall(&self, now: Instant) {
        if self.phase.load(Ordering::Acquire) == ROSE {
            self.fall.store(micros(now), Ordering::Relaxed);
            let _ = self
                .phase
                .compare_exchange(ROSE, FELL, Ordering::Release, Ordering::Relaxed);
        }
    }

    /// Record an edge given the level the echo line settled at
    pub fn on_edge(&self, high: bool, now: Instant) {
        if high {
            self.record_rise(now);
        } else {
            self.record_fall(now);
        }
    }

    /// Forget any previous pulse and start accepting edges
    pub fn arm(&self) {
        self.phase.store(ARMED, Ordering::Release);
    }

    /// Stop accepting edges
    ///
    /// Returns the rising edge of an unfinished pulse, if one was seen.
    pub fn disarm(&self) -> Option<u32> {
        match self.phase.swap(IDLE, Ordering::AcqRel) {
            ROSE | FELL => Some(self.rise.load(Ordering::Relaxed)),
            _ => None,
        }
    }

    /// Take a complete pulse, leaving the capture idle
    pub fn take(&self) -> Option<EchoPulse> {
        if self.phase.load(Ordering::Acquire) != FELL {
            return None;
        }
        let pulse = EchoPulse {
            rise: self.rise.load(Ordering::Relaxed),
            fall: self.fall.load(Ordering::Relaxed),
        };
        self.phase.store(IDLE, Ordering::Release);
        Some(pulse)
    }

    /// An armed measurement is still waiting for its echo
    pub fn is_waiting(&self) -> bool {
        matches!(self.phase.load(Ordering::Acquire), ARMED | ROSE)
    }
}

impl Default for EchoCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranger timing configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangerConfig {
    /// Minimum time from the last echo rise to the next trigger
    pub cooldown_since_rise: Duration,
    /// Minimum time from the last echo fall to the next trigger
    pub cooldown_since_fall: Duration,
    /// Width of the trigger pulse
    pub trigger_pulse: Duration,
    /// Give up on an echo this long after the trigger; `None` waits forever
    pub echo_timeout: Option<Duration>,
}

impl RangerConfig {
    /// Furthest range the HC-SR04 reports reliably
    pub const MAX_DISTANCE: Distance = Distance::from_mm(5000);

    /// Time out echoes longer than an obstacle at `max` would produce
    pub fn with_max_distance(self, max: Distance) -> Self {
        Self {
            echo_timeout: Some(max.echo_duration() + ECHO_START_ALLOWANCE),
            ..self
        }
    }

    /// Wait for an echo indefinitely
    pub fn without_timeout(self) -> Self {
        Self {
            echo_timeout: None,
            ..self
        }
    }
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            // The datasheet asks for over 60 ms between measurements
            cooldown_since_rise: Duration::from_millis(250),
            cooldown_since_fall: Duration::from_millis(250),
            trigger_pulse: Duration::from_micros(10),
            echo_timeout: None,
        }
        .with_max_distance(Self::MAX_DISTANCE)
    }
}

/// Ranger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangerError<E> {
    /// Driving the trigger pin failed
    Pin(E),
    /// No complete echo arrived within the configured timeout
    EchoTimeout,
}

/// Ultrasonic ranger
///
/// Polled with [`Ultrasonic::update`]; the echo line is timestamped elsewhere into the
/// borrowed [`EchoCapture`].
pub struct Ultrasonic<'a, T, D> {
    trigger: T,
    delay: D,
    echo: &'a EchoCapture,
    config: RangerConfig,
    /// Trigger time of the measurement in flight
    pending: Option<Instant>,
    last_rise: Option<u32>,
    last_fall: Option<u32>,
    distance: Distance,
}

impl<'a, T, D> Ultrasonic<'a, T, D>
where
    T: OutputPin,
    D: DelayNs,
{
    /// Create a ranger, driving the trigger line low
    pub fn new(mut trigger: T, delay: D, echo: &'a EchoCapture, config: RangerConfig) -> Result<Self, T::Error> {
        trigger.set_low()?;
        echo.disarm();
        Ok(Self {
            trigger,
            delay,
            echo,
            config,
            pending: None,
            last_rise: None,
            last_fall: None,
            distance: Distance::default(),
        })
    }

    /// Advance the measurement cycle
    ///
    /// Returns `Ok(true)` when a new [`Distance`] is available. When idle and both cooldowns
    /// have passed this fires the trigger pulse, blocking for its few microseconds.
    pub fn update(&mut self, now: Instant) -> Result<bool, RangerError<T::Error>> {
        match self.pending {
            Some(started) => self.collect(started, now),
            None => {
                if self.cooled_down(now) {
                    self.send_pulse(now).map_err(RangerError::Pin)?;
                }
                Ok(false)
            }
        }
    }

    fn collect(&mut self, started: Instant, now: Instant) -> Result<bool, RangerError<T::Error>> {
        if let Some(pulse) = self.echo.take() {
            self.pending = None;
            self.last_rise = Some(pulse.rise);
            self.last_fall = Some(pulse.fall);
            self.distance = Distance::from_echo(pulse.duration());
            return Ok(true);
        }

        let Some(timeout) = self.config.echo_timeout else {
            return Ok(false);
        };
        if now.saturating_duration_since(started) < timeout {
            return Ok(false);
        }

        // Cool down from whatever the sensor last did, the trigger if it never answered
        self.pending = None;
        self.last_rise = Some(self.echo.disarm().unwrap_or(micros(started)));
        self.last_fall = None;
        Err(RangerError::EchoTimeout)
    }

    fn cooled_down(&self, now: Instant) -> bool {
        let now = micros(now);
        let since = |edge: Option<u32>, cooldown: Duration| {
            edge.map_or(true, |t| u64::from(now.wrapping_sub(t)) >= cooldown.as_micros())
        };
        since(self.last_rise, self.config.cooldown_since_rise) && since(self.last_fall, self.config.cooldown_since_fall)
    }

    fn send_pulse(&mut self, now: Instant) -> Result<(), T::Error> {
        self.echo.arm();
        if let Err(e) = self.pulse_trigger() {
            self.echo.disarm();
            return Err(e);
        }
        self.pending = Some(now);
        Ok(())
    }

    fn pulse_trigger(&mut self) -> Result<(), T::Error> {
        self.trigger.set_low()?;
        self.delay.delay_us(TRIGGER_SETUP_US);
        self.trigger.set_high()?;
        self.delay.delay_us(self.config.trigger_pulse.as_micros() as u32);
        self.trigger.set_low()
    }

    /// Last measured range; zero until the first measurement completes
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// A trigger has been sent and its echo is not in yet
    pub fn is_measuring(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the trigger pin and delay
    pub fn release(self) -> (T, D) {
        self.echo.disarm();
        (self.trigger, self.delay)
    }
}
