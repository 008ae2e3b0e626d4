//! Bounded staging buffer for the shared communication channel.
//!
//! A single [`ChannelBuffer`] stages the outgoing request text and then the
//! incoming response text of each exchange. The buffer grows on demand but
//! never beyond its configured capacity; writes that would exceed it fail with
//! [`ProtocolError::BufferOverflow`] instead of truncating.
//!
//! The buffer has no locking of its own. Exclusive access is provided by the
//! channel gate that owns it.

use std::borrow::Cow;

use bytes::BytesMut;
use tracing::trace;

use crate::{ProtocolError, Result};

/// Initial allocation; enough for a typical credential report.
const INITIAL_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct ChannelBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl ChannelBuffer {
    /// Create an empty buffer that will hold at most `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY.min(capacity)),
            capacity,
        }
    }

    /// Maximum number of bytes the buffer accepts.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Replace the contents with `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BufferOverflow`] if `data` is larger than the
    /// capacity. The buffer is left empty in that case.
    pub fn stage(&mut self, data: &[u8]) -> Result<()> {
        self.buf.clear();
        self.append(data)
    }

    /// Append `data` to the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BufferOverflow`] if the result would exceed the
    /// capacity. Nothing is appended in that case.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        let needed = self.buf.len() + data.len();
        if needed > self.capacity {
            return Err(ProtocolError::BufferOverflow {
                needed,
                capacity: self.capacity,
            });
        }
        self.buf.extend_from_slice(data);
        trace!(len = self.buf.len(), "Channel buffer staged");
        Ok(())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Contents as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    /// Drop the contents so nothing from one exchange leaks into the next.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
