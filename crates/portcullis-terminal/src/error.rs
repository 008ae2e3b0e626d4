//! Error types for the terminal core.

use portcullis_hardware::HardwareError;
use portcullis_network::ChannelError;
use portcullis_rfid::PipelineError;

/// Result type alias for terminal operations.
pub type Result<T> = std::result::Result<T, TerminalError>;

/// Failure to take a gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The bounded wait elapsed while another task held the gate.
    #[error("Timed out after {waited_ms}ms waiting for the {gate} gate")]
    Timeout { gate: &'static str, waited_ms: u64 },

    /// Shutdown was requested while waiting.
    #[error("Cancelled while waiting for the {gate} gate")]
    Cancelled { gate: &'static str },
}

/// Errors raised inside one task cycle.
///
/// Tasks log these and start their next cycle; only cancellation ends a task.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Peripheral error: {0}")]
    Hardware(#[from] HardwareError),

    /// Shutdown was requested during the operation.
    #[error("Cancelled")]
    Cancelled,

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl TerminalError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True if the operation stopped because shutdown was requested.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Gate(GateError::Cancelled { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_error_display() {
        let err = GateError::Timeout {
            gate: "indicator",
            waited_ms: 2000,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 2000ms waiting for the indicator gate"
        );
    }

    #[test]
    fn test_is_cancelled() {
        assert!(TerminalError::Cancelled.is_cancelled());
        assert!(TerminalError::from(GateError::Cancelled { gate: "channel" }).is_cancelled());
        assert!(
            !TerminalError::from(GateError::Timeout {
                gate: "channel",
                waited_ms: 1
            })
            .is_cancelled()
        );
        assert!(!TerminalError::config("bad").is_cancelled());
    }
}
