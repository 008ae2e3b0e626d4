//! Mock power sensor driven by a scripted trace of readings.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    HardwareError, Result, battery::AdcCalibration, traits::PowerSensor, types::PowerReading,
};

/// Reading reported before anything is scripted: external power, full battery.
pub const NOMINAL_READING: PowerReading = PowerReading {
    externally_powered: true,
    battery_mv: 4200,
};

#[derive(Debug)]
struct PowerScript {
    pending: VecDeque<PowerReading>,
    last: PowerReading,
    samples: usize,
}

/// Mock power sensor.
///
/// Each `read` consumes the next scripted reading. Once the script runs out
/// the last reading repeats.
///
/// # Examples
///
/// ```
/// use portcullis_hardware::mock::MockPowerSensor;
/// use portcullis_hardware::traits::PowerSensor;
/// use portcullis_hardware::PowerReading;
///
/// #[tokio::main]
/// async fn main() -> portcullis_hardware::Result<()> {
///     let (mut sensor, handle) = MockPowerSensor::new();
///     let low = PowerReading { externally_powered: false, battery_mv: 3400 };
///     handle.push(low);
///
///     assert_eq!(sensor.read().await?, low);
///     assert_eq!(sensor.read().await?, low);
///     assert_eq!(handle.samples(), 2);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPowerSensor {
    script: Arc<Mutex<PowerScript>>,
}

impl MockPowerSensor {
    pub fn new() -> (Self, MockPowerSensorHandle) {
        Self::with_reading(NOMINAL_READING)
    }

    /// Create a sensor that reports `reading` until scripted otherwise.
    pub fn with_reading(reading: PowerReading) -> (Self, MockPowerSensorHandle) {
        let script = Arc::new(Mutex::new(PowerScript {
            pending: VecDeque::new(),
            last: reading,
            samples: 0,
        }));
        let sensor = Self {
            script: Arc::clone(&script),
        };
        let handle = MockPowerSensorHandle {
            script,
            calibration: AdcCalibration::default(),
        };
        (sensor, handle)
    }
}

impl Default for MockPowerSensor {
    fn default() -> Self {
        Self::new().0
    }
}

impl PowerSensor for MockPowerSensor {
    async fn read(&mut self) -> Result<PowerReading> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = script.pending.pop_front() {
            script.last = next;
        }
        script.samples += 1;
        Ok(script.last)
    }
}

/// Handle for scripting a mock power sensor.
#[derive(Debug, Clone)]
pub struct MockPowerSensorHandle {
    script: Arc<Mutex<PowerScript>>,
    calibration: AdcCalibration,
}

impl MockPowerSensorHandle {
    /// Queue one reading.
    pub fn push(&self, reading: PowerReading) {
        self.lock().pending.push_back(reading);
    }

    /// Queue a whole trace of readings.
    pub fn extend(&self, readings: impl IntoIterator<Item = PowerReading>) {
        self.lock().pending.extend(readings);
    }

    /// Queue a reading built from a burst of raw ADC samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the burst is empty.
    pub fn push_raw(&self, externally_powered: bool, raw: &[u16]) -> Result<()> {
        let battery_mv = self
            .calibration
            .millivolts(raw)
            .ok_or_else(|| HardwareError::invalid_data("empty ADC burst"))?;
        self.push(PowerReading {
            externally_powered,
            battery_mv,
        });
        Ok(())
    }

    /// Drop any queued readings and report `reading` from now on.
    pub fn set(&self, reading: PowerReading) {
        let mut script = self.lock();
        script.pending.clear();
        script.last = reading;
    }

    /// Number of readings taken so far.
    pub fn samples(&self) -> usize {
        self.lock().samples
    }

    /// Queued readings not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PowerScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
