//! The shared communication channel.
//!
//! A [`Channel`] pairs a [`Transport`] with the single [`ChannelBuffer`] used
//! to stage request and response text. It performs one exchange at a time by
//! construction (`&mut self`); sharing it between tasks is done by wrapping it
//! in a gate.

use std::time::Duration;

use portcullis_core::constants::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_REQUEST_TIMEOUT_MS};
use portcullis_protocol::{ChannelBuffer, ProtocolError, StatusResponse};
use tracing::{debug, trace, warn};

use crate::error::{ChannelError, Result};
use crate::transport::{Request, Transport};

/// Request/response exchange over a transport.
///
/// # Examples
///
/// ```
/// use portcullis_network::mock::MockTransport;
/// use portcullis_network::Channel;
/// use portcullis_protocol::StatusCode;
///
/// #[tokio::main]
/// async fn main() -> portcullis_network::Result<()> {
///     let (transport, handle) = MockTransport::new();
///     handle.reply("100 OK");
///
///     let mut channel = Channel::new(transport);
///     let status = channel.exchange("rid=0x01", None).await?;
///     assert_eq!(status.code, StatusCode::Parsed(100));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Channel<T> {
    transport: T,
    buffer: ChannelBuffer,
    timeout: Duration,
}

impl<T: Transport> Channel<T> {
    /// Create a channel with the default buffer capacity and timeout.
    pub fn new(transport: T) -> Self {
        Self::with_limits(
            transport,
            DEFAULT_MAX_RESPONSE_BYTES,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    /// Create a channel with an explicit buffer capacity and exchange timeout.
    pub fn with_limits(transport: T, capacity: usize, timeout: Duration) -> Self {
        Self {
            transport,
            buffer: ChannelBuffer::new(capacity),
            timeout,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one exchange and decode the status line.
    ///
    /// The request text is staged into the channel buffer, sent, and replaced
    /// by the response text. A response that does not decode is not an error:
    /// it yields [`StatusResponse::unparsed`].
    ///
    /// # Errors
    ///
    /// - [`ChannelError::RequestTooLarge`] / [`ChannelError::ResponseTooLarge`]
    ///   if either side does not fit the buffer
    /// - [`ChannelError::Timeout`] if the exchange takes longer than the timeout
    /// - any transport error
    pub async fn exchange(&mut self, query: &str, cookie: Option<&str>) -> Result<StatusResponse> {
        self.buffer
            .stage(query.as_bytes())
            .map_err(|e| {
                overflow(e, |size, capacity| ChannelError::RequestTooLarge { size, capacity })
            })?;
        trace!(len = self.buffer.len(), "Staged request");

        let body = {
            let staged = self.buffer.as_text();
            let request = Request {
                query: &staged,
                cookie,
                max_response: self.buffer.capacity(),
            };

            match tokio::time::timeout(self.timeout, self.transport.exchange(request)).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!("Exchange timeout after {}ms", self.timeout.as_millis());
                    return Err(ChannelError::timeout(self.timeout.as_millis() as u64));
                }
            }
        };

        self.buffer
            .stage(&body)
            .map_err(|e| {
                overflow(e, |size, capacity| ChannelError::ResponseTooLarge { size, capacity })
            })?;
        trace!(len = self.buffer.len(), "Staged response");

        let status = StatusResponse::from_body(&self.buffer.as_text());
        debug!(code = %status.code, message = %status.message, "Exchange complete");
        Ok(status)
    }
}

fn overflow(error: ProtocolError, make: fn(usize, usize) -> ChannelError) -> ChannelError {
    match error {
        ProtocolError::BufferOverflow { needed, capacity } => make(needed, capacity),
        other => ChannelError::transport(other.to_string()),
    }
}
