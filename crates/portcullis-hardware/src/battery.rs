//! Battery voltage measurement and classification.
//!
//! The battery is sampled through a resistor divider on a 12-bit ADC with a
//! 1.1 V reference. A measurement averages a burst of raw samples:
//!
//! ```text
//! mV = (avg_raw * reference_mv / levels) * divider
//! ```

use portcullis_core::constants::DEFAULT_BATTERY_CRITICAL_MV;

use crate::types::{PowerReading, PowerSample};

/// ADC parameters for converting raw samples to battery millivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcCalibration {
    /// ADC reference voltage in millivolts.
    pub reference_mv: u32,

    /// Number of ADC levels (4096 for 12 bits).
    pub levels: u32,

    /// Voltage divider multiplier.
    pub divider: u32,

    /// Raw samples averaged per measurement.
    pub samples: usize,
}

impl Default for AdcCalibration {
    fn default() -> Self {
        Self {
            reference_mv: 1100,
            levels: 4096,
            divider: 6,
            samples: 64,
        }
    }
}

impl AdcCalibration {
    /// Convert a burst of raw samples to battery millivolts.
    ///
    /// Returns `None` for an empty burst.
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis_hardware::AdcCalibration;
    ///
    /// let adc = AdcCalibration::default();
    /// assert_eq!(adc.millivolts(&[2048; 64]), Some(3300));
    /// ```
    #[must_use]
    pub fn millivolts(&self, raw: &[u16]) -> Option<u32> {
        if raw.is_empty() || self.levels == 0 {
            return None;
        }
        let sum: u64 = raw.iter().map(|&r| u64::from(r)).sum();
        let avg = sum / raw.len() as u64;
        let mv = (avg * u64::from(self.reference_mv) / u64::from(self.levels))
            * u64::from(self.divider);
        u32::try_from(mv).ok()
    }
}

/// Classifies battery readings against the critical threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryGauge {
    critical_mv: u32,
}

impl Default for BatteryGauge {
    fn default() -> Self {
        Self::new(DEFAULT_BATTERY_CRITICAL_MV)
    }
}

impl BatteryGauge {
    #[must_use]
    pub const fn new(critical_mv: u32) -> Self {
        Self { critical_mv }
    }

    #[must_use]
    pub fn critical_mv(&self) -> u32 {
        self.critical_mv
    }

    /// A battery is critical strictly below the threshold.
    #[must_use]
    pub fn is_critical(&self, battery_mv: u32) -> bool {
        battery_mv < self.critical_mv
    }

    /// Derive the power sample used by the power monitor.
    #[must_use]
    pub fn classify(&self, reading: PowerReading) -> PowerSample {
        PowerSample {
            externally_powered: reading.externally_powered,
            battery_critical: self.is_critical(reading.battery_mv),
        }
    }
}
