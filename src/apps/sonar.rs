//! Ultrasonic ranging.
//!
//! Two tasks share the sensor's [`EchoCapture`]: [`echo_task`] timestamps every edge on
//! the echo line, [`ranging_task`] triggers measurements and reports distances. Both run
//! on the thread executor, so an edge is stamped when its task is polled; the other tasks
//! only run for microseconds per wake, which keeps that latency well inside a millimetre.

use crate::apps::buzzer::request_beep;
use defmt::{info, warn};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals::{EXTI6, PD5, PD6},
    Peri,
};
use embassy_time::{Delay, Duration, Instant, Ticker};
use snake_io::{Distance, EchoCapture, RangerConfig, RangerError, Ultrasonic};

/// How often the ranger state machine is advanced
const POLL_PERIOD: Duration = Duration::from_millis(5);

/// Obstacles closer than this sound the buzzer
const PROXIMITY: Distance = Distance::from_mm(150);
const PROXIMITY_BEEP: Duration = Duration::from_millis(30);

/// Embassy task stamping echo edges into the capture.
#[embassy_executor::task]
pub async fn echo_task(
    echo_pin: Peri<'static, PD6>,
    echo_line: Peri<'static, EXTI6>,
    capture: &'static EchoCapture,
) -> ! {
    let mut echo = ExtiInput::new(echo_pin, echo_line, Pull::Down);

    loop {
        echo.wait_for_any_edge().await;
        capture.on_edge(echo.is_high(), Instant::now());
    }
}

/// Embassy task running the ranger.
///
/// Measurements are logged; a missing echo is logged and the ranger retriggers once its
/// cooldown has passed.
#[embassy_executor::task]
pub async fn ranging_task(trigger: Peri<'static, PD5>, capture: &'static EchoCapture) -> ! {
    let trigger = Output::new(trigger, Level::Low, Speed::Low);
    let config = RangerConfig::default();
    let Ok(mut ranger) = Ultrasonic::new(trigger, Delay, capture, config);

    info!("Sonar ready: {}", config);

    let mut ticker = Ticker::every(POLL_PERIOD);
    loop {
        match ranger.update(Instant::now()) {
            Ok(true) => {
                let distance = ranger.distance();
                info!("Sonar: {} mm", distance.mm());
                if distance < PROXIMITY {
                    request_beep(PROXIMITY_BEEP);
                }
            }
            Ok(false) => {}
            Err(RangerError::EchoTimeout) => {
                warn!("Sonar: no echo, retrying after cooldown");
            }
            Err(RangerError::Pin(e)) => match e {},
        }
        ticker.next().await;
    }
}
