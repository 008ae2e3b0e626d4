//! Error types for hardware operations.
//!
//! This module defines error types specific to peripheral operations,
//! covering device disconnection, credential authentication and read
//! failures, and malformed sensor data.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// No credential was presented during the read attempt.
    #[error("No credential in field")]
    NoCredential,

    /// The credential rejected the block key.
    #[error("Authentication of block {block} failed")]
    AuthenticationFailed { block: u8 },

    /// Card reading error.
    #[error("Card read error on block {block}: {message}")]
    CardReadError { block: u8, message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new authentication failure.
    pub fn authentication(block: u8) -> Self {
        Self::AuthenticationFailed { block }
    }

    /// Create a new card read error.
    pub fn card_read(block: u8, message: impl Into<String>) -> Self {
        Self::CardReadError {
            block,
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("PN532");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: PN532");
    }

    #[test]
    fn test_authentication_error() {
        let error = HardwareError::authentication(5);
        assert!(matches!(error, HardwareError::AuthenticationFailed { block: 5 }));
        assert_eq!(error.to_string(), "Authentication of block 5 failed");
    }

    #[test]
    fn test_card_read_error() {
        let error = HardwareError::card_read(4, "CRC mismatch");
        assert_eq!(error.to_string(), "Card read error on block 4: CRC mismatch");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(HardwareError::NoCredential.to_string(), "No credential in field");
        assert_eq!(
            HardwareError::invalid_data("short frame").to_string(),
            "Invalid data: short frame"
        );
    }
}
