use thiserror::Error;

/// Result type alias for exchange operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Errors at the exchange boundary.
///
/// None of these are fatal to the terminal; the task that owns the exchange
/// logs the error and starts its next cycle.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The request could not be delivered or the response not received.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The exchange did not complete in time.
    #[error("Exchange timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The remote authority answered with a non-success transport status.
    #[error("Unexpected response status {status}")]
    ResponseStatus { status: u16 },

    /// The request does not fit the channel buffer.
    #[error("Request of {size} bytes exceeds buffer capacity {capacity}")]
    RequestTooLarge { size: usize, capacity: usize },

    /// The response does not fit the channel buffer.
    #[error("Response of {size} bytes exceeds buffer capacity {capacity}")]
    ResponseTooLarge { size: usize, capacity: usize },
}

impl ChannelError {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// True for errors caused by the exchange taking too long.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
