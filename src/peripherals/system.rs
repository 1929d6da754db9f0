//! System initialization and clock configuration for STM32H753.
//!
//! The console only needs GPIO, EXTI and the embassy time driver on TIM2, so the core runs
//! well below its maximum and no USB clock is set up.

use embassy_stm32::{rcc::*, Config, Peripherals};

/// Initialize the STM32H753 clocks and return its peripherals.
///
/// - **400 MHz** system clock from PLL1 fed by the 64 MHz HSI
/// - **200 MHz** AHB clock
/// - **100 MHz** APB clocks, so TIM2 ticks at 200 MHz for the 1 MHz embassy time base
/// - **Scale1** voltage scaling, enough for 400 MHz
///
/// # Panics
///
/// Panics if the clock configuration is rejected, which indicates invalid settings.
pub fn init_system() -> Peripherals {
    let mut config = Config::default();

    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    // PLL1 = HSI(64MHz) / 4 * 50 / 2 = 400MHz
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV2;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;

    config.rcc.voltage_scale = VoltageScale::Scale1;

    embassy_stm32::init(config)
}
