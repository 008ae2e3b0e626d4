//! Battery warning hysteresis.
//!
//! # States
//!
//! - `Normal`: no warning shown
//! - `Warning`: battery critical while running on battery; the indicator is
//!   held orange
//!
//! # Transitions
//!
//! - Normal → Warning: a sample that is both not externally powered and
//!   battery critical
//! - Warning → Normal: the first sample that is externally powered, whatever
//!   the battery level
//!
//! Entering needs two conditions and leaving needs one. A battery that
//! recovers above the threshold while still unplugged does not clear the
//! warning.
//!
//! # Examples
//!
//! ```
//! use portcullis_hardware::PowerSample;
//! use portcullis_terminal::power::{PowerMonitor, PowerState, PowerTransition};
//!
//! let mut monitor = PowerMonitor::new();
//!
//! // Critical but plugged in: nothing happens
//! assert_eq!(monitor.observe(PowerSample::new(true, true)), None);
//!
//! // Unplugged and critical: warning
//! assert_eq!(
//!     monitor.observe(PowerSample::new(false, true)),
//!     Some(PowerTransition::EnterWarning)
//! );
//!
//! // Battery recovers, still unplugged: warning stays
//! assert_eq!(monitor.observe(PowerSample::new(false, false)), None);
//! assert_eq!(monitor.state(), PowerState::Warning);
//!
//! // Plugged back in: warning clears
//! assert_eq!(
//!     monitor.observe(PowerSample::new(true, true)),
//!     Some(PowerTransition::ExitWarning)
//! );
//! ```

use std::fmt;

use portcullis_hardware::PowerSample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    #[default]
    Normal,
    Warning,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("Normal"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    EnterWarning,
    ExitWarning,
}

/// Two-state battery monitor fed one sample at a time.
#[derive(Debug, Clone, Default)]
pub struct PowerMonitor {
    state: PowerState,
}

impl PowerMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_warning(&self) -> bool {
        self.state == PowerState::Warning
    }

    /// Feed one sample and report the transition it caused, if any.
    pub fn observe(&mut self, sample: PowerSample) -> Option<PowerTransition> {
        match self.state {
            PowerState::Normal if !sample.externally_powered && sample.battery_critical => {
                self.state = PowerState::Warning;
                Some(PowerTransition::EnterWarning)
            }
            PowerState::Warning if sample.externally_powered => {
                self.state = PowerState::Normal;
                Some(PowerTransition::ExitWarning)
            }
            _ => None,
        }
    }
}
