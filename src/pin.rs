//! Logical on/off mapping for digital pins.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Pin level that means "on" for a line
///
/// Buttons wired to ground with a pull-up and the console's buzzer transistor are both
/// active-low, so that is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    #[default]
    Low,
}

impl ActiveLevel {
    /// Pin state that drives the line to the requested logical level
    pub fn state(self, on: bool) -> PinState {
        match (self, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => PinState::High,
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => PinState::Low,
        }
    }

    /// Logical level of a line given its electrical level
    pub fn is_on(self, high: bool) -> bool {
        match self {
            ActiveLevel::High => high,
            ActiveLevel::Low => !high,
        }
    }
}

/// Drive `pin` on or off
pub(crate) fn drive<P: OutputPin>(pin: &mut P, level: ActiveLevel, on: bool) -> Result<(), P::Error> {
    pin.set_state(level.state(on))
}

/// Read the logical level of `pin`
pub(crate) fn sample<P: InputPin>(pin: &mut P, level: ActiveLevel) -> Result<bool, P::Error> {
    Ok(level.is_on(pin.is_high()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_inverts() {
        assert_eq!(ActiveLevel::Low.state(true), PinState::Low);
        assert_eq!(ActiveLevel::Low.state(false), PinState::High);
        assert!(ActiveLevel::Low.is_on(false));
        assert!(!ActiveLevel::Low.is_on(true));
    }

    #[test]
    fn active_high_passes_through() {
        assert_eq!(ActiveLevel::High.state(true), PinState::High);
        assert_eq!(ActiveLevel::High.state(false), PinState::Low);
        assert!(ActiveLevel::High.is_on(true));
    }
}
