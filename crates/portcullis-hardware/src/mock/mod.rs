//! Mock device implementations for testing and development.
//!
//! Each mock is created as a `(device, handle)` pair. The device implements
//! the peripheral trait and is handed to the terminal; the handle stays with
//! the test (or the simulator) to script inputs and inspect outputs.

pub mod indicator;
pub mod power;
pub mod reader;

// Re-export commonly used types
pub use indicator::{IndicatorChange, MockIndicator, MockIndicatorHandle};
pub use power::{MockPowerSensor, MockPowerSensorHandle, NOMINAL_READING};
pub use reader::{MockCard, MockCredentialReader, MockCredentialReaderHandle, ReaderOp};
