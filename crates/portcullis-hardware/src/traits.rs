//! Peripheral trait definitions.
//!
//! These traits are the contract between the terminal core and the devices it
//! drives. The core only ever sees a credential's identifier and its block
//! contents, a requested indicator state, and a power reading; how bytes move
//! over SPI, GPIO or the ADC lives behind these interfaces.
//!
//! Methods return `impl Future + Send` (Rust 1.90 + Edition 2024 RPITIT) so a
//! generic task that owns a device can be spawned on the multi-threaded
//! runtime. Implementations are free to write the methods as `async fn`.
//!
//! # Object Safety
//!
//! The traits are not object-safe. Use generic type parameters:
//!
//! ```no_run
//! use portcullis_hardware::traits::CredentialReader;
//! use portcullis_hardware::Result;
//!
//! async fn wait_for_card<R: CredentialReader>(reader: &mut R) -> Result<String> {
//!     let id = reader.detect().await?;
//!     Ok(id.to_string())
//! }
//! ```

use std::future::Future;

use portcullis_core::constants::BLOCK_SIZE;
use portcullis_core::{BlockKey, CredentialId};

use crate::error::Result;
use crate::types::{IndicatorState, PowerReading};

/// Proximity credential reader.
///
/// A read cycle is `detect`, then for each block `authenticate_block`
/// followed by `read_block`. A block must be authenticated before it is read.
pub trait CredentialReader: Send {
    /// Wait for a credential to enter the field and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NoCredential`](crate::HardwareError::NoCredential)
    /// if the underlying read attempt ends without a credential.
    fn detect(&mut self) -> impl Future<Output = Result<CredentialId>> + Send;

    /// Authenticate one block of the detected credential with the shared key.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::AuthenticationFailed`](crate::HardwareError::AuthenticationFailed)
    /// if the credential rejects the key.
    fn authenticate_block(
        &mut self,
        credential: &CredentialId,
        block: u8,
        key: &BlockKey,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read the content of a previously authenticated block.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::CardReadError`](crate::HardwareError::CardReadError)
    /// if the block cannot be read.
    fn read_block(&mut self, block: u8) -> impl Future<Output = Result<[u8; BLOCK_SIZE]>> + Send;
}

/// The single bicolor visual signal.
pub trait Indicator: Send {
    /// Drive the indicator to `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven.
    fn set(&mut self, state: IndicatorState) -> impl Future<Output = Result<()>> + Send;
}

/// Power source and battery sensing.
pub trait PowerSensor: Send {
    /// Take one power reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be sampled.
    fn read(&mut self) -> impl Future<Output = Result<PowerReading>> + Send;
}
