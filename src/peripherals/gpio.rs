//! Pin assignments for the Snake console.
//!
//! The direction pad and start button pull to ground (active low), the buzzer transistor
//! sinks current when its line is low, and the HC-SR04 sits on two spare port D pins with
//! its echo line routed to EXTI6.

use embassy_stm32::{
    peripherals::{EXTI6, PD0, PD1, PD2, PD3, PD4, PD5, PD6, PD7},
    Peri,
};
use snake_io::EchoCapture;
use static_cell::StaticCell;

/// Echo handoff for the sonar, shared by its edge listener and ranging task
pub static SONAR_CAPTURE: StaticCell<EchoCapture> = StaticCell::new();

/// Peripheral collection for the direction pad and start button
pub struct ButtonPeripherals<'d> {
    pub up: Peri<'d, PD0>,
    pub down: Peri<'d, PD1>,
    pub left: Peri<'d, PD2>,
    pub right: Peri<'d, PD3>,
    pub start: Peri<'d, PD7>,
}

/// Macro to claim peripherals for the buttons
#[macro_export]
macro_rules! claim_buttons {
    ($peripherals:expr) => {{
        $crate::peripherals::gpio::ButtonPeripherals {
            up: $peripherals.PD0,
            down: $peripherals.PD1,
            left: $peripherals.PD2,
            right: $peripherals.PD3,
            start: $peripherals.PD7,
        }
    }};
}

/// Peripheral collection for the buzzer
pub struct BuzzerPeripherals<'d> {
    pub out: Peri<'d, PD4>,
}

/// Macro to claim peripherals for the buzzer
#[macro_export]
macro_rules! claim_buzzer {
    ($peripherals:expr) => {{
        $crate::peripherals::gpio::BuzzerPeripherals { out: $peripherals.PD4 }
    }};
}

/// Peripheral collection for the ultrasonic ranger
pub struct SonarPeripherals<'d> {
    pub trigger: Peri<'d, PD5>,
    pub echo_pin: Peri<'d, PD6>,
    pub echo_line: Peri<'d, EXTI6>,
    pub capture: &'d EchoCapture,
}

/// Macro to claim peripherals for the ultrasonic ranger
///
/// Can only be used once: the echo capture is taken from [`SONAR_CAPTURE`].
#[macro_export]
macro_rules! claim_sonar {
    ($peripherals:expr) => {{
        $crate::peripherals::gpio::SonarPeripherals {
            trigger: $peripherals.PD5,
            echo_pin: $peripherals.PD6,
            echo_line: $peripherals.EXTI6,
            capture: $crate::peripherals::gpio::SONAR_CAPTURE.init(snake_io::EchoCapture::new()),
        }
    }};
}
