//! Core constants for the portcullis terminal.
//!
//! This module defines the sizes, wire keys, status codes and default timings
//! shared by every crate in the workspace. Keeping them in one place ensures the
//! credential pipeline, the wire codec and the task loops agree on the layout of
//! a credential record and on the meaning of the remote authority's replies.
//!
//! # Record Layout
//!
//! ```text
//! rid=0x<16 hex>&cid=0x<2..16 hex>&data=0x<64 hex>
//! ```
//!
//! Where:
//! - `rid` - Reader identifier (8 bytes, configured)
//! - `cid` - Credential identifier (1-8 bytes, as reported by the credential)
//! - `data` - Credential payload (2 blocks of 16 bytes)
//!
//! The derived reader key travels separately as `rkey=0x<64 hex>` in the
//! request cookie.
//!
//! # Usage
//!
//! ```
//! use portcullis_core::constants::*;
//!
//! assert_eq!(PAYLOAD_LEN, BLOCK_SIZE * BLOCKS_PER_RECORD);
//! assert_eq!(STATUS_ACCESS_GRANTED, 100);
//! ```

// ============================================================================
// Identity
// ============================================================================

/// Length of the reader identifier in bytes.
pub const READER_ID_LEN: usize = 8;

/// Length of the derived reader key in bytes (HMAC-SHA256 output).
pub const READER_KEY_LEN: usize = 32;

/// Reader identifier used when no identifier is configured.
pub const DEFAULT_READER_ID: [u8; READER_ID_LEN] = [0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78];

// ============================================================================
// Credential Layout
// ============================================================================

/// Maximum length of a credential identifier in bytes.
pub const MAX_CREDENTIAL_ID_LEN: usize = 8;

/// Size of one credential storage block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Number of blocks read into a single credential record.
pub const BLOCKS_PER_RECORD: usize = 2;

/// Length of the credential payload in bytes.
pub const PAYLOAD_LEN: usize = BLOCK_SIZE * BLOCKS_PER_RECORD;

/// First block read from a credential when none is configured.
///
/// Block 0 holds manufacturer data and block 3 is the first sector trailer,
/// so application data starts at block 4.
pub const DEFAULT_FIRST_BLOCK: u8 = 4;

/// Length of the block authentication key in bytes.
pub const BLOCK_KEY_LEN: usize = 6;

/// Factory-default block authentication key.
pub const DEFAULT_BLOCK_KEY: [u8; BLOCK_KEY_LEN] = [0xFF; BLOCK_KEY_LEN];

// ============================================================================
// Wire Keys
// ============================================================================

/// Query key for the reader identifier.
pub const FIELD_READER_ID: &str = "rid";

/// Query key for the credential identifier.
pub const FIELD_CREDENTIAL_ID: &str = "cid";

/// Query key for the credential payload.
pub const FIELD_PAYLOAD: &str = "data";

/// Cookie key for the derived reader key.
pub const FIELD_READER_KEY: &str = "rkey";

/// Separator between encoded fields.
pub const FIELD_SEPARATOR: char = '&';

/// Prefix placed between a field key and its hex value.
pub const HEX_VALUE_PREFIX: &str = "=0x";

// ============================================================================
// Status Codes
// ============================================================================

/// Status code: credential access granted.
pub const STATUS_ACCESS_GRANTED: u32 = 100;

/// Status code: liveness report acknowledged.
pub const STATUS_LIVENESS_ACK: u32 = 200;

/// Shortest status text that can be decoded.
pub const MIN_STATUS_LEN: usize = 6;

/// Message substituted when a status response cannot be decoded.
pub const UNREADABLE_RESPONSE_MESSAGE: &str = "Unreadable response";

/// Default upper bound for a response body in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 2048;

// ============================================================================
// Power
// ============================================================================

/// Battery voltage below which the battery is critical (millivolts).
pub const DEFAULT_BATTERY_CRITICAL_MV: u32 = 3600;

// ============================================================================
// Default Timings (milliseconds)
// ============================================================================

/// Interval between liveness reports.
pub const DEFAULT_LIVENESS_INTERVAL_MS: u64 = 10_000;

/// Interval between power samples.
pub const DEFAULT_POWER_SAMPLE_INTERVAL_MS: u64 = 1_000;

/// How long a granted/denied verdict stays on the indicator.
pub const DEFAULT_VERDICT_DISPLAY_MS: u64 = 500;

/// On time of each pulse of the error flash.
pub const DEFAULT_ERROR_FLASH_ON_MS: u64 = 200;

/// Off time between the two pulses of the error flash.
pub const DEFAULT_ERROR_FLASH_OFF_MS: u64 = 100;

/// Length of the boot self-test blink.
pub const DEFAULT_SELF_TEST_MS: u64 = 200;

/// Timeout for a single request/response exchange.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3_000;

/// Longest wait for the channel gate before a report is abandoned.
pub const DEFAULT_CHANNEL_ACQUIRE_TIMEOUT_MS: u64 = 30_000;

/// Longest wait for the indicator gate before a verdict is skipped.
pub const DEFAULT_INDICATOR_ACQUIRE_TIMEOUT_MS: u64 = 2_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_whole_blocks() {
        assert_eq!(PAYLOAD_LEN % BLOCK_SIZE, 0);
        assert_eq!(PAYLOAD_LEN, 32);
    }

    #[test]
    fn test_status_codes_are_distinct() {
        assert_ne!(STATUS_ACCESS_GRANTED, STATUS_LIVENESS_ACK);
    }

    #[test]
    fn test_error_flash_fits_in_verdict_window() {
        let flash = 2 * DEFAULT_ERROR_FLASH_ON_MS + DEFAULT_ERROR_FLASH_OFF_MS;
        assert!(flash <= DEFAULT_VERDICT_DISPLAY_MS);
    }
}
