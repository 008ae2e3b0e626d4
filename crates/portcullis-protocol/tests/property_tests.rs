//! Property-based tests for the wire codec.
//!
//! These tests use proptest to check the encoding shape for arbitrary byte
//! arrays and the decoding contract for arbitrary status lines.

use portcullis_core::constants::MIN_STATUS_LEN;
use proptest::prelude::*;
use portcullis_protocol::{ProtocolError, StatusCode, decode_status, encode_field};

/// Strategy for generating field keys (lowercase, no delimiters).
fn valid_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Failed to create key regex strategy")
}

/// Strategy for generating status messages without line terminators.
fn valid_message() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 .,!-]{2,60}")
        .expect("Failed to create message regex strategy")
}

proptest! {
    /// Property: every encoded field is `key=0x` followed by 2*len lowercase hex digits.
    #[test]
    fn prop_encode_field_shape(key in valid_key(), bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = encode_field(None, &key, &bytes);
        let prefix = format!("{key}=0x");

        prop_assert!(encoded.starts_with(&prefix));
        let digits = &encoded[prefix.len()..];
        prop_assert_eq!(digits.len(), 2 * bytes.len());
        prop_assert!(digits.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    /// Property: a prefix is always joined with exactly one `&`.
    #[test]
    fn prop_encode_field_prefix(prefix in "[a-z]{1,8}=0x[0-9a-f]{0,8}", key in valid_key(), bytes in prop::collection::vec(any::<u8>(), 0..8)) {
        let bare = encode_field(None, &key, &bytes);
        let joined = encode_field(Some(&prefix), &key, &bytes);
        prop_assert_eq!(joined, format!("{prefix}&{bare}"));
    }

    /// Property: well-formed `<code> <msg>` lines decode to exactly that code and message.
    #[test]
    fn prop_decode_recovers_code_and_message(code in 100u32..100_000, message in valid_message()) {
        let response = decode_status(&format!("{code} {message}")).unwrap();
        prop_assert_eq!(response.code, StatusCode::Parsed(code));
        prop_assert_eq!(response.message, message);
    }

    /// Property: anything shorter than the threshold is malformed.
    #[test]
    fn prop_decode_short_is_malformed(text in "[0-9 A-Za-z]{0,5}") {
        prop_assume!(text.len() < MIN_STATUS_LEN);
        let is_malformed = matches!(decode_status(&text), Err(ProtocolError::Malformed { .. }));
        prop_assert!(is_malformed);
    }

    /// Property: leading digits not followed by a space are malformed.
    #[test]
    fn prop_decode_requires_space(code in 0u32..1000, sep in "[A-Za-z_\\-]", rest in "[A-Za-z ]{5,20}") {
        let is_malformed = matches!(
            decode_status(&format!("{code}{sep}{rest}")),
            Err(ProtocolError::Malformed { .. })
        );
        prop_assert!(is_malformed);
    }
}
