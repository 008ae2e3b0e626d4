//! Terminal configuration.
//!
//! All durations are milliseconds so the structure maps one-to-one onto a
//! TOML file. Every field has a default; a configuration file only needs to
//! name what differs.
//!
//! ```toml
//! reader_id = "1234567812345678"
//! server_url = "http://192.168.0.100:8080/access"
//! liveness_interval_ms = 10000
//! indicator_acquire_timeout_ms = 2000
//! ```

use std::time::Duration;

use portcullis_core::constants::{
    BLOCKS_PER_RECORD, DEFAULT_BATTERY_CRITICAL_MV, DEFAULT_CHANNEL_ACQUIRE_TIMEOUT_MS,
    DEFAULT_ERROR_FLASH_OFF_MS, DEFAULT_ERROR_FLASH_ON_MS, DEFAULT_FIRST_BLOCK,
    DEFAULT_INDICATOR_ACQUIRE_TIMEOUT_MS, DEFAULT_LIVENESS_INTERVAL_MS,
    DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_POWER_SAMPLE_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SELF_TEST_MS, DEFAULT_VERDICT_DISPLAY_MS, MIN_STATUS_LEN,
};
use portcullis_core::{BlockKey, ReaderId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerminalError};
use crate::gate::AcquireTimeout;

/// Configuration for the terminal core
///
/// # Example
///
/// ```
/// use portcullis_terminal::TerminalConfig;
///
/// let config = TerminalConfig {
///     server_url: "http://127.0.0.1:8080/access".to_string(),
///     liveness_interval_ms: 30_000,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// Fixed identifier of this reader
    pub reader_id: ReaderId,

    /// Base address of the remote authority
    pub server_url: String,

    /// Timeout for one exchange
    pub request_timeout_ms: u64,

    /// Pause between liveness reports
    pub liveness_interval_ms: u64,

    /// Pause between power samples
    pub power_sample_interval_ms: u64,

    /// How long a green or red verdict stays on
    pub verdict_display_ms: u64,

    /// On time of each red flash in the error pattern
    pub error_flash_on_ms: u64,

    /// Off time between the two red flashes
    pub error_flash_off_ms: u64,

    /// Green blink at startup; `0` skips it
    pub self_test_ms: u64,

    /// Wait limit for the channel gate; `0` waits until shutdown
    pub channel_acquire_timeout_ms: u64,

    /// Wait limit for the indicator gate in the credential task; `0` waits until shutdown
    pub indicator_acquire_timeout_ms: u64,

    /// First credential block of the record
    pub first_block: u8,

    /// Key used to authenticate credential blocks
    pub block_key: BlockKey,

    /// Capacity of the channel buffer
    pub max_response_bytes: usize,

    /// Battery level below which the battery is critical
    pub battery_critical_mv: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            reader_id: ReaderId::default(),
            server_url: "http://127.0.0.1:8080/".to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            liveness_interval_ms: DEFAULT_LIVENESS_INTERVAL_MS,
            power_sample_interval_ms: DEFAULT_POWER_SAMPLE_INTERVAL_MS,
            verdict_display_ms: DEFAULT_VERDICT_DISPLAY_MS,
            error_flash_on_ms: DEFAULT_ERROR_FLASH_ON_MS,
            error_flash_off_ms: DEFAULT_ERROR_FLASH_OFF_MS,
            self_test_ms: DEFAULT_SELF_TEST_MS,
            channel_acquire_timeout_ms: DEFAULT_CHANNEL_ACQUIRE_TIMEOUT_MS,
            indicator_acquire_timeout_ms: DEFAULT_INDICATOR_ACQUIRE_TIMEOUT_MS,
            first_block: DEFAULT_FIRST_BLOCK,
            block_key: BlockKey::default(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            battery_critical_mv: DEFAULT_BATTERY_CRITICAL_MV,
        }
    }
}

impl TerminalConfig {
    /// Check values that would make a task spin or never complete.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(TerminalError::config("server_url must not be empty"));
        }
        for (name, value) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("liveness_interval_ms", self.liveness_interval_ms),
            ("power_sample_interval_ms", self.power_sample_interval_ms),
            ("verdict_display_ms", self.verdict_display_ms),
            ("error_flash_on_ms", self.error_flash_on_ms),
        ] {
            if value == 0 {
                return Err(TerminalError::config(format!("{name} must be positive")));
            }
        }
        if usize::from(self.first_block) + BLOCKS_PER_RECORD > usize::from(u8::MAX) + 1 {
            return Err(TerminalError::config(format!(
                "first_block {} leaves no room for {BLOCKS_PER_RECORD} blocks",
                self.first_block
            )));
        }
        if self.max_response_bytes < MIN_STATUS_LEN {
            return Err(TerminalError::config(format!(
                "max_response_bytes must be at least {MIN_STATUS_LEN}"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms)
    }

    pub fn power_sample_interval(&self) -> Duration {
        Duration::from_millis(self.power_sample_interval_ms)
    }

    pub fn verdict_display(&self) -> Duration {
        Duration::from_millis(self.verdict_display_ms)
    }

    pub fn error_flash_on(&self) -> Duration {
        Duration::from_millis(self.error_flash_on_ms)
    }

    pub fn error_flash_off(&self) -> Duration {
        Duration::from_millis(self.error_flash_off_ms)
    }

    pub fn self_test(&self) -> Option<Duration> {
        (self.self_test_ms > 0).then(|| Duration::from_millis(self.self_test_ms))
    }

    pub fn channel_acquire_timeout(&self) -> AcquireTimeout {
        AcquireTimeout::from_millis(self.channel_acquire_timeout_ms)
    }

    pub fn indicator_acquire_timeout(&self) -> AcquireTimeout {
        AcquireTimeout::from_millis(self.indicator_acquire_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = TerminalConfig::default();
        assert_eq!(config.reader_id.to_string(), "1234567812345678");
        assert_eq!(config.liveness_interval(), Duration::from_secs(10));
        assert_eq!(config.power_sample_interval(), Duration::from_secs(1));
        assert_eq!(config.verdict_display(), Duration::from_millis(500));
        assert_eq!(config.first_block, 4);
        assert_eq!(config.battery_critical_mv, 3600);
        assert_eq!(
            config.indicator_acquire_timeout(),
            AcquireTimeout::Bounded(Duration::from_secs(2))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: TerminalConfig = serde_json::from_str(
            r#"{"reader_id": "0102030405060708", "channel_acquire_timeout_ms": 0}"#,
        )
        .unwrap();
        assert_eq!(config.reader_id.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(config.channel_acquire_timeout(), AcquireTimeout::Unbounded);
        assert_eq!(config.verdict_display_ms, 500);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<TerminalConfig>(r#"{"reader": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_self_test_disabled() {
        let config = TerminalConfig {
            self_test_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.self_test(), None);
    }

    #[rstest]
    #[case::empty_url(TerminalConfig { server_url: " ".into(), ..Default::default() })]
    #[case::zero_liveness(TerminalConfig { liveness_interval_ms: 0, ..Default::default() })]
    #[case::zero_sampling(TerminalConfig { power_sample_interval_ms: 0, ..Default::default() })]
    #[case::last_block(TerminalConfig { first_block: 255, ..Default::default() })]
    #[case::tiny_buffer(TerminalConfig { max_response_bytes: 2, ..Default::default() })]
    fn test_invalid(#[case] config: TerminalConfig) {
        assert!(matches!(
            config.validate(),
            Err(TerminalError::Config { .. })
        ));
    }
}
