//! Input and output helpers for the Snake console.
//!
//! Three independent units, each a small state machine polled once per loop iteration:
//! - [`debounce`]: debounced digital inputs with stable, lockout and prompt policies
//! - [`beeper`]: non-blocking single-shot beeper on an output pin
//! - [`ultrasonic`]: HC-SR04 style ranger fed by an edge-captured echo
//!
//! Time is always passed in by the caller as an [`embassy_time::Instant`] and pins are
//! [`embedded_hal`] traits, so the units run unchanged on the board and on the host.

#![cfg_attr(not(test), no_std)]

pub mod beeper;
pub mod debounce;
pub mod pin;
pub mod timer;
pub mod ultrasonic;

pub use beeper::{Beeper, BeeperConfig};
pub use debounce::{Debounce, DebounceConfig, DebouncePolicy, DebouncedInput};
pub use pin::ActiveLevel;
pub use timer::OneShot;
pub use ultrasonic::{Distance, EchoCapture, RangerConfig, RangerError, Ultrasonic};
