use crate::{
    Result,
    constants::{BLOCK_KEY_LEN, MAX_CREDENTIAL_ID_LEN, PAYLOAD_LEN, READER_ID_LEN, READER_KEY_LEN},
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Parse a hex string of an exact byte length, accepting an optional `0x` prefix.
fn parse_hex_exact<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let digits = s.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    let bytes = hex::decode(digits)
        .map_err(|e| Error::InvalidIdentifier(format!("{what} is not valid hex: {e}")))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        Error::InvalidIdentifier(format!(
            "{what} must be {N} bytes, got {}",
            bytes.len()
        ))
    })
}

/// Reader identifier (8 bytes, fixed per terminal)
///
/// Serializes as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReaderId([u8; READER_ID_LEN]);

impl ReaderId {
    #[must_use]
    pub const fn new(bytes: [u8; READER_ID_LEN]) -> Self {
        ReaderId(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; READER_ID_LEN] {
        &self.0
    }
}

impl Default for ReaderId {
    fn default() -> Self {
        ReaderId(crate::constants::DEFAULT_READER_ID)
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for ReaderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex_exact::<READER_ID_LEN>(s, "Reader ID").map(ReaderId)
    }
}

impl TryFrom<String> for ReaderId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ReaderId> for String {
    fn from(id: ReaderId) -> Self {
        id.to_string()
    }
}

/// Secret reader key derived once at startup.
///
/// # Security
/// The key can only be produced by [`derive_reader_key`](crate::derive_reader_key).
/// There is no mutable access to its bytes, `Debug` never prints them, and
/// equality is checked in constant time.
#[derive(Clone)]
pub struct ReaderKey([u8; READER_KEY_LEN]);

impl ReaderKey {
    pub(crate) fn from_bytes(bytes: [u8; READER_KEY_LEN]) -> Self {
        ReaderKey(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; READER_KEY_LEN] {
        &self.0
    }

    /// First four bytes as hex, safe to log for correlating terminals.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ReaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReaderKey({}…)", self.fingerprint())
    }
}

impl PartialEq for ReaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ReaderKey {}

/// Process-wide identity of the terminal.
///
/// Built once at startup and shared read-only (usually behind an `Arc`)
/// with every task for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    reader_id: ReaderId,
    reader_key: ReaderKey,
}

impl Identity {
    /// Derive the reader key from `seed` and bind it to `reader_id`.
    ///
    /// # Errors
    /// Returns `Error::KeySetupFailed` or `Error::KeyInputRejected` when
    /// derivation fails. Both are fatal: the terminal must not start.
    pub fn derive(reader_id: ReaderId, seed: &[u8]) -> Result<Self> {
        let reader_key = crate::derive_reader_key(&reader_id, seed)?;
        Ok(Identity {
            reader_id,
            reader_key,
        })
    }

    #[must_use]
    pub fn reader_id(&self) -> &ReaderId {
        &self.reader_id
    }

    #[must_use]
    pub fn reader_key(&self) -> &ReaderKey {
        &self.reader_key
    }
}

/// Key used to authenticate credential blocks (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockKey([u8; BLOCK_KEY_LEN]);

impl BlockKey {
    #[must_use]
    pub const fn new(bytes: [u8; BLOCK_KEY_LEN]) -> Self {
        BlockKey(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BLOCK_KEY_LEN] {
        &self.0
    }
}

impl Default for BlockKey {
    fn default() -> Self {
        BlockKey(crate::constants::DEFAULT_BLOCK_KEY)
    }
}

impl fmt::Debug for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlockKey(..)")
    }
}

impl std::str::FromStr for BlockKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex_exact::<BLOCK_KEY_LEN>(s, "Block key").map(BlockKey)
    }
}

impl TryFrom<String> for BlockKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BlockKey> for String {
    fn from(key: BlockKey) -> Self {
        hex::encode(key.0)
    }
}

/// Credential identifier (1-8 bytes with explicit length)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId {
    bytes: [u8; MAX_CREDENTIAL_ID_LEN],
    len: u8,
}

impl CredentialId {
    /// Create a credential identifier from the bytes reported by the credential.
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentifier` if `bytes` is empty or longer than
    /// [`MAX_CREDENTIAL_ID_LEN`].
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let len = bytes.len();
        if !(1..=MAX_CREDENTIAL_ID_LEN).contains(&len) {
            return Err(Error::InvalidIdentifier(format!(
                "Credential ID must be 1-{MAX_CREDENTIAL_ID_LEN} bytes, got {len}"
            )));
        }

        let mut buf = [0u8; MAX_CREDENTIAL_ID_LEN];
        buf[..len].copy_from_slice(bytes);
        Ok(CredentialId {
            bytes: buf,
            len: len as u8,
        })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl std::str::FromStr for CredentialId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let bytes = hex::decode(digits)
            .map_err(|e| Error::InvalidIdentifier(format!("Credential ID is not valid hex: {e}")))?;
        CredentialId::new(&bytes)
    }
}

/// One complete credential read.
///
/// Produced by the credential pipeline only when every block was read, owned by
/// the reporting task until it has been encoded, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub credential_id: CredentialId,
    pub payload: [u8; PAYLOAD_LEN],
    pub read_at: DateTime<Utc>,
}

impl CredentialRecord {
    #[must_use]
    pub fn new(credential_id: CredentialId, payload: [u8; PAYLOAD_LEN]) -> Self {
        CredentialRecord {
            credential_id,
            payload,
            read_at: Utc::now(),
        }
    }
}
