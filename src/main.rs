//! Firmware entry point for the Snake console I/O board.
//!
//! Initializes the STM32H753 and spawns one task per I/O unit: the buttons, the buzzer,
//! and the ultrasonic ranger with its echo listener.

#![no_std]
#![no_main]

// Application modules
mod apps;
mod peripherals;

use defmt::info;
use embassy_executor::Spawner;
use peripherals::init_system;

// Import panic handler and defmt RTT for debugging
#[cfg(not(feature = "debug"))]
use panic_halt as _;
#[cfg(feature = "debug")]
use {defmt_rtt as _, panic_probe as _};

/// Main application entry point
///
/// Initializes the system and spawns all tasks. Never returns.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting Snake I/O firmware v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = init_system();

    info!("System initialized, spawning tasks...");

    spawner
        .spawn(apps::buzzer::buzzer_task(claim_buzzer!(peripherals)))
        .unwrap();
    spawner
        .spawn(apps::controls::controls_task(claim_buttons!(peripherals)))
        .unwrap();

    let sonar = claim_sonar!(peripherals);
    spawner
        .spawn(apps::sonar::echo_task(sonar.echo_pin, sonar.echo_line, sonar.capture))
        .unwrap();
    spawner
        .spawn(apps::sonar::ranging_task(sonar.trigger, sonar.capture))
        .unwrap();

    loop {
        embassy_time::Timer::after(embassy_time::Duration::from_secs(60)).await;
        info!("System heartbeat - all tasks running");
    }
}
