//! Direction pad and start button.
//!
//! The direction buttons use the prompt policy so a press registers on the first edge
//! once the pad has been quiet; the start button uses a lockout so a bouncing press cannot
//! pause and resume the game in one go.

use crate::apps::buzzer::request_beep;
use crate::peripherals::gpio::ButtonPeripherals;
use defmt::{debug, info};
use embassy_stm32::{
    gpio::{Input, Pin, Pull},
    Peri,
};
use embassy_time::{Duration, Instant, Ticker};
use snake_io::{ActiveLevel, DebounceConfig, DebouncePolicy, DebouncedInput};

/// How often the buttons are sampled
const POLL_PERIOD: Duration = Duration::from_millis(1);

const DIRECTION_DEBOUNCE: DebounceConfig = DebounceConfig::new(Duration::from_millis(20), DebouncePolicy::Prompt);
const START_DEBOUNCE: DebounceConfig = DebounceConfig::new(Duration::from_millis(250), DebouncePolicy::Lockout);

/// Click played on every press
const CLICK: Duration = Duration::from_millis(5);

/// Console button
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Start,
}

fn button(pin: Peri<'static, impl Pin>, config: DebounceConfig, now: Instant) -> DebouncedInput<Input<'static>> {
    let Ok(input) = DebouncedInput::new(Input::new(pin, Pull::Up), ActiveLevel::Low, config, now);
    input
}

/// Embassy task polling the console buttons.
///
/// Presses are logged and answered with a short click from the buzzer.
#[embassy_executor::task]
pub async fn controls_task(claims: ButtonPeripherals<'static>) -> ! {
    let now = Instant::now();
    let mut pad = [
        (Button::Up, button(claims.up, DIRECTION_DEBOUNCE, now)),
        (Button::Down, button(claims.down, DIRECTION_DEBOUNCE, now)),
        (Button::Left, button(claims.left, DIRECTION_DEBOUNCE, now)),
        (Button::Right, button(claims.right, DIRECTION_DEBOUNCE, now)),
        (Button::Start, button(claims.start, START_DEBOUNCE, now)),
    ];

    info!("Controls ready");

    let mut ticker = Ticker::every(POLL_PERIOD);
    loop {
        let now = Instant::now();
        for (name, input) in pad.iter_mut() {
            let Ok(changed) = input.poll(now);
            if !changed {
                continue;
            }
            if input.rose() {
                info!("Pressed {}", name);
                request_beep(CLICK);
            } else {
                debug!("Released {}", name);
            }
        }
        ticker.next().await;
    }
}
