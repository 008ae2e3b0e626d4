//! Common types shared across peripheral implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual state of the bicolor indicator.
///
/// The indicator is a single red/green LED pair; orange is both on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    /// Both channels off.
    #[default]
    Off,

    /// Access denied, or error flash.
    Red,

    /// Access granted, or boot self-test.
    Green,

    /// Battery critical warning.
    Orange,
}

impl IndicatorState {
    /// Pin levels `(green, red)` for an active-low bicolor LED.
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis_hardware::IndicatorState;
    ///
    /// assert_eq!(IndicatorState::Off.pin_levels(), (true, true));
    /// assert_eq!(IndicatorState::Orange.pin_levels(), (false, false));
    /// ```
    #[must_use]
    pub fn pin_levels(self) -> (bool, bool) {
        match self {
            Self::Off => (true, true),
            Self::Red => (true, false),
            Self::Green => (false, true),
            Self::Orange => (false, false),
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Red => "red",
            Self::Green => "green",
            Self::Orange => "orange",
        };
        f.write_str(name)
    }
}

/// Raw reading from a power sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerReading {
    /// The terminal is running from an external source.
    pub externally_powered: bool,

    /// Battery voltage in millivolts.
    pub battery_mv: u32,
}

/// Power state derived from one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSample {
    pub externally_powered: bool,
    pub battery_critical: bool,
}

impl PowerSample {
    #[must_use]
    pub const fn new(externally_powered: bool, battery_critical: bool) -> Self {
        Self {
            externally_powered,
            battery_critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IndicatorState::Off, (true, true))]
    #[case(IndicatorState::Red, (true, false))]
    #[case(IndicatorState::Green, (false, true))]
    #[case(IndicatorState::Orange, (false, false))]
    fn test_pin_levels(#[case] state: IndicatorState, #[case] levels: (bool, bool)) {
        assert_eq!(state.pin_levels(), levels);
    }

    #[test]
    fn test_indicator_default_is_off() {
        assert_eq!(IndicatorState::default(), IndicatorState::Off);
    }

    #[test]
    fn test_indicator_serialization() {
        let json = serde_json::to_string(&IndicatorState::Orange).unwrap();
        assert_eq!(json, "\"orange\"");
        let back: IndicatorState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, IndicatorState::Orange);
    }
}
