//! Error types for the wire codec.

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding requests or decoding responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Status text does not have the `<code> <message>` shape.
    #[error("Malformed status response: {reason}")]
    Malformed { reason: String },

    /// Data does not fit in the bounded channel buffer.
    #[error("Buffer overflow: need {needed} bytes, capacity is {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },
}

impl ProtocolError {
    /// Create a new malformed response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let error = ProtocolError::malformed("too short");
        assert_eq!(error.to_string(), "Malformed status response: too short");
    }

    #[test]
    fn test_overflow_display() {
        let error = ProtocolError::BufferOverflow {
            needed: 4096,
            capacity: 2048,
        };
        assert_eq!(
            error.to_string(),
            "Buffer overflow: need 4096 bytes, capacity is 2048"
        );
    }
}
