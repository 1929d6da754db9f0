//! Application layer for the Snake console.
//!
//! Each application owns one of the I/O units from the `snake_io` library and drives it
//! from an embassy task:
//! - direction pad and start button through debounced inputs
//! - the buzzer, woken by beep requests and by its own deadline
//! - the ultrasonic ranger and the edge listener that feeds it

/// Buzzer task and beep requests
pub mod buzzer;
/// Direction pad and start button polling
pub mod controls;
/// Ultrasonic ranging
pub mod sonar;
