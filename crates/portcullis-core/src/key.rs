//! Reader key derivation.
//!
//! The reader key authenticates the terminal to the remote authority. It is an
//! HMAC-SHA256 over a boot-time seed, keyed with the reader identifier:
//!
//! ```text
//! rkey = HMAC-SHA256(key = rid, message = seed without trailing terminators)
//! ```
//!
//! The derivation is deterministic (no nonce, no randomness) and runs exactly
//! once per process. The result is stored in an immutable [`Identity`].
//!
//! # Examples
//!
//! ```
//! use portcullis_core::{ReaderId, derive_reader_key};
//!
//! let rid = ReaderId::default();
//! let a = derive_reader_key(&rid, b"seed\n").unwrap();
//! let b = derive_reader_key(&rid, b"seed").unwrap();
//! assert_eq!(a, b);
//! ```
//!
//! [`Identity`]: crate::Identity

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::READER_KEY_LEN;
use crate::{Error, ReaderId, ReaderKey, Result};

type HmacSha256 = Hmac<Sha256>;

/// Bytes stripped from the end of the seed before hashing.
///
/// Seeds are usually provisioned as text files, so a trailing newline (or a
/// C-style NUL) is not part of the secret.
const SEED_TERMINATORS: &[u8] = b"\r\n\0";

/// Strip trailing line terminators and NULs from a seed.
fn strip_terminators(seed: &[u8]) -> &[u8] {
    let end = seed
        .iter()
        .rposition(|b| !SEED_TERMINATORS.contains(b))
        .map_or(0, |pos| pos + 1);
    &seed[..end]
}

/// Derive the 32-byte reader key from the reader identifier and a seed.
///
/// # Errors
///
/// - `Error::KeyInputRejected` if the seed is empty once terminators are removed.
/// - `Error::KeySetupFailed` if the keyed hash cannot be initialized.
pub fn derive_reader_key(reader_id: &ReaderId, seed: &[u8]) -> Result<ReaderKey> {
    let message = strip_terminators(seed);
    if message.is_empty() {
        return Err(Error::KeyInputRejected(
            "seed is empty after stripping terminators".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(reader_id.as_bytes())
        .map_err(|e| Error::KeySetupFailed(e.to_string()))?;
    mac.update(message);

    let digest = mac.finalize().into_bytes();
    let bytes: [u8; READER_KEY_LEN] = digest
        .as_slice()
        .try_into()
        .map_err(|_| Error::KeySetupFailed(format!("digest is not {READER_KEY_LEN} bytes")))?;

    Ok(ReaderKey::from_bytes(bytes))
}
