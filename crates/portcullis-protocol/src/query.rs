//! Request encoding.
//!
//! Each field is rendered as `key=0x<hex>` with two lowercase hex digits per
//! byte and no separators inside the value. Fields are joined with `&`.
//! Output sizes are computed before writing so each request is built with a
//! single allocation.

use portcullis_core::constants::{
    FIELD_CREDENTIAL_ID, FIELD_PAYLOAD, FIELD_READER_ID, FIELD_READER_KEY, FIELD_SEPARATOR,
    HEX_VALUE_PREFIX,
};
use portcullis_core::{CredentialRecord, Identity};
use tracing::trace;

/// Length of `key=0x<hex>` for a value of `value_len` bytes.
///
/// # Examples
///
/// ```
/// use portcullis_protocol::encoded_field_len;
///
/// assert_eq!(encoded_field_len("rid", 8), "rid=0x".len() + 16);
/// ```
#[must_use]
pub fn encoded_field_len(key: &str, value_len: usize) -> usize {
    key.len() + HEX_VALUE_PREFIX.len() + 2 * value_len
}

/// Append one field to `out`, inserting the separator when `out` is not empty.
fn push_field(out: &mut String, key: &str, bytes: &[u8]) {
    if !out.is_empty() {
        out.push(FIELD_SEPARATOR);
    }
    out.push_str(key);
    out.push_str(HEX_VALUE_PREFIX);
    out.push_str(&hex::encode(bytes));
}

/// Encode a single field, optionally after an existing prefix.
///
/// With a prefix the result is `<prefix>&key=0x<hex>`; without one the
/// leading `&` is omitted entirely.
///
/// # Examples
///
/// ```
/// use portcullis_protocol::encode_field;
///
/// assert_eq!(encode_field(None, "cid", &[0xAA, 0x0B]), "cid=0xaa0b");
/// assert_eq!(encode_field(Some("rid=0x01"), "cid", &[0xFF]), "rid=0x01&cid=0xff");
/// ```
#[must_use]
pub fn encode_field(prefix: Option<&str>, key: &str, bytes: &[u8]) -> String {
    let prefix_len = prefix.map_or(0, |p| p.len() + 1);
    let mut out = String::with_capacity(prefix_len + encoded_field_len(key, bytes.len()));

    if let Some(prefix) = prefix {
        out.push_str(prefix);
        out.push(FIELD_SEPARATOR);
    }
    out.push_str(key);
    out.push_str(HEX_VALUE_PREFIX);
    out.push_str(&hex::encode(bytes));
    out
}

/// Encode a credential report: `rid`, `cid` and `data`, in that order.
#[must_use]
pub fn encode_record(record: &CredentialRecord, identity: &Identity) -> String {
    let reader_id = identity.reader_id().as_bytes();
    let credential_id = record.credential_id.as_bytes();

    let capacity = encoded_field_len(FIELD_READER_ID, reader_id.len())
        + encoded_field_len(FIELD_CREDENTIAL_ID, credential_id.len())
        + encoded_field_len(FIELD_PAYLOAD, record.payload.len())
        + 2;

    let mut out = String::with_capacity(capacity);
    push_field(&mut out, FIELD_READER_ID, reader_id);
    push_field(&mut out, FIELD_CREDENTIAL_ID, credential_id);
    push_field(&mut out, FIELD_PAYLOAD, &record.payload);

    debug_assert_eq!(out.len(), capacity);
    trace!(query = %out, "Encoded credential report");
    out
}

/// Encode a liveness report: the reader identifier only.
#[must_use]
pub fn encode_liveness(identity: &Identity) -> String {
    encode_field(None, FIELD_READER_ID, identity.reader_id().as_bytes())
}

/// Encode the reader key as the cookie value sent with every report.
#[must_use]
pub fn encode_reader_key(identity: &Identity) -> String {
    encode_field(None, FIELD_READER_KEY, identity.reader_key().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::{CredentialId, ReaderId};
    use rstest::rstest;

    fn identity() -> Identity {
        Identity::derive(ReaderId::default(), b"seed").unwrap()
    }

    #[rstest]
    #[case(&[], "rid=0x")]
    #[case(&[0x00], "rid=0x00")]
    #[case(&[0x0A, 0xFF], "rid=0x0aff")]
    #[case(&[0x12, 0x34, 0x56, 0x78], "rid=0x12345678")]
    fn test_encode_field_without_prefix(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(encode_field(None, "rid", bytes), expected);
    }

    #[test]
    fn test_encode_field_with_prefix() {
        let first = encode_field(None, "rid", &[0x01]);
        let second = encode_field(Some(&first), "cid", &[0x02]);
        assert_eq!(second, "rid=0x01&cid=0x02");
    }

    #[test]
    fn test_encode_field_empty_prefix_still_separates() {
        assert_eq!(encode_field(Some(""), "cid", &[0x02]), "&cid=0x02");
    }

    #[test]
    fn test_encode_record_field_order() {
        let cid = CredentialId::new(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
        let mut payload = [0u8; 32];
        for (i, b) in payload.iter_mut().enumerate() {
            *b = i as u8;
        }
        let record = CredentialRecord::new(cid, payload);

        let query = encode_record(&record, &identity());
        assert_eq!(
            query,
            "rid=0x1234567812345678&cid=0xaabbccdd&data=0x\
             000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        );
    }

    #[test]
    fn test_encode_record_does_not_pad_credential_id() {
        let cid = CredentialId::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]).unwrap();
        let record = CredentialRecord::new(cid, [0; 32]);
        let query = encode_record(&record, &identity());
        assert!(query.contains("&cid=0x01020304050607&"));
    }

    #[test]
    fn test_encode_liveness() {
        assert_eq!(encode_liveness(&identity()), "rid=0x1234567812345678");
    }

    #[test]
    fn test_encode_reader_key() {
        let identity = identity();
        let cookie = encode_reader_key(&identity);
        assert!(cookie.starts_with("rkey=0x"));
        assert_eq!(cookie.len(), encoded_field_len("rkey", 32));
        assert_eq!(&cookie[7..], hex::encode(identity.reader_key().as_bytes()));
    }
}
