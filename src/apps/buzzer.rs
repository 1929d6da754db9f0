//! Buzzer application.
//!
//! Other tasks ask for a beep through [`request_beep`]; the buzzer task owns the pin and
//! sleeps until either a request arrives or the current beep is due to end.

use crate::peripherals::gpio::BuzzerPeripherals;
use defmt::{debug, info};
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Timer};
use snake_io::{Beeper, BeeperConfig};

/// Latest beep request; a newer request replaces one not yet picked up
static BEEP_REQUEST: Signal<CriticalSectionRawMutex, Duration> = Signal::new();

/// Ask the buzzer to sound for `duration`, restarting any beep in progress
pub fn request_beep(duration: Duration) {
    BEEP_REQUEST.signal(duration);
}

/// Embassy task owning the buzzer.
///
/// The line starts high (idle for the active-low buzzer) and never fails to drive, so the
/// beeper's pin results are infallible.
#[embassy_executor::task]
pub async fn buzzer_task(claims: BuzzerPeripherals<'static>) -> ! {
    let out = Output::new(claims.out, Level::High, Speed::Low);
    let Ok(mut beeper) = Beeper::new(out, BeeperConfig::default());

    info!("Buzzer ready");

    loop {
        let wake = beeper.deadline().unwrap_or(Instant::MAX);

        match select(BEEP_REQUEST.wait(), Timer::at(wake)).await {
            Either::First(duration) => {
                debug!("Beep for {} ms", duration.as_millis());
                let Ok(()) = beeper.beep_for(duration, Instant::now());
            }
            Either::Second(()) => {
                let Ok(()) = beeper.poll(Instant::now());
            }
        }
    }
}
