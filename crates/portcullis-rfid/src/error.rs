//! Credential pipeline errors.

use portcullis_hardware::HardwareError;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Reason a credential read produced no record.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The read attempt ended without a credential in the field.
    #[error("No credential presented")]
    NoCredential {
        #[source]
        source: HardwareError,
    },

    /// The credential rejected the block key.
    #[error("Authentication failed at block {block}")]
    AuthFailed {
        block: u8,
        #[source]
        source: HardwareError,
    },

    /// An authenticated block could not be read.
    #[error("Read failed at block {block}")]
    ReadFailed {
        block: u8,
        #[source]
        source: HardwareError,
    },
}

impl PipelineError {
    /// Block at which the read stopped, if it got past detection.
    pub fn block(&self) -> Option<u8> {
        match self {
            Self::NoCredential { .. } => None,
            Self::AuthFailed { block, .. } | Self::ReadFailed { block, .. } => Some(*block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_names_block() {
        let err = PipelineError::AuthFailed {
            block: 5,
            source: HardwareError::authentication(5),
        };
        assert_eq!(err.to_string(), "Authentication failed at block 5");
        assert_eq!(err.block(), Some(5));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_no_credential_has_no_block() {
        let err = PipelineError::NoCredential {
            source: HardwareError::NoCredential,
        };
        assert_eq!(err.block(), None);
    }
}
