//! Peripheral abstraction layer for the portcullis terminal.
//!
//! The terminal core never touches pins, buses or ADC registers directly. It
//! consumes three peripheral interfaces defined here:
//!
//! - [`CredentialReader`]: waits for a proximity credential, authenticates and
//!   reads its fixed-size blocks
//! - [`Indicator`]: the single bicolor visual signal ([`IndicatorState`])
//! - [`PowerSensor`]: external-power detection and battery voltage
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O operations are asynchronous (Rust 1.90 + Edition
//!   2024 RPITIT). Every returned future is `Send` so device-owning loops can be
//!   spawned on the Tokio runtime.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result] with a
//!   [`HardwareError`] describing the failure.
//! - **Mockable**: the [`mock`] module provides programmable devices for
//!   development and testing without physical hardware.
//!
//! # Examples
//!
//! ```
//! use portcullis_hardware::mock::{MockCard, MockCredentialReader};
//! use portcullis_hardware::traits::CredentialReader;
//! use portcullis_core::CredentialId;
//!
//! #[tokio::main]
//! async fn main() -> portcullis_hardware::Result<()> {
//!     let (mut reader, handle) = MockCredentialReader::new();
//!
//!     let id = CredentialId::new(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
//!     handle.present(MockCard::new(id)).await?;
//!
//!     assert_eq!(reader.detect().await?, id);
//!     Ok(())
//! }
//! ```

pub mod battery;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use battery::{AdcCalibration, BatteryGauge};
pub use error::{HardwareError, Result};
pub use traits::{CredentialReader, Indicator, PowerSensor};
pub use types::{IndicatorState, PowerReading, PowerSample};
