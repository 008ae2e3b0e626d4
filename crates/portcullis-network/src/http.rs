//! HTTP transport to the remote authority.
//!
//! Each exchange is a single `GET <server_url>?<query>` with the reader key
//! carried in the `Cookie` header. Only a `200 OK` is a successful exchange;
//! the body is handed back untouched, and never buffered past the request's
//! `max_response` limit.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use portcullis_core::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use reqwest::header::COOKIE;
use tracing::{debug, error, trace, warn};

use crate::error::{ChannelError, Result};
use crate::transport::{Request, Transport};

/// Configuration for the HTTP transport
///
/// # Example
///
/// ```
/// use portcullis_network::HttpTransportConfig;
/// use std::time::Duration;
///
/// let config = HttpTransportConfig {
///     server_url: "http://192.168.0.100:8080/access".to_string(),
///     timeout: Duration::from_millis(5000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base address of the remote authority
    pub server_url: String,

    /// Timeout for the whole request (connect, send, receive)
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/".to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

/// HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    server_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        debug!(server_url = %config.server_url, "Creating HTTP transport");

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChannelError::transport(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            server_url: config.server_url,
            timeout: config.timeout,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Full request URL for `query`.
    ///
    /// ```
    /// use portcullis_network::{HttpTransport, HttpTransportConfig};
    ///
    /// let transport = HttpTransport::new(HttpTransportConfig {
    ///     server_url: "http://host/access".to_string(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    /// assert_eq!(transport.url_for("rid=0x01"), "http://host/access?rid=0x01");
    /// assert_eq!(transport.url_for(""), "http://host/access");
    /// ```
    pub fn url_for(&self, query: &str) -> String {
        if query.is_empty() {
            return self.server_url.clone();
        }
        let joiner = if self.server_url.contains('?') { '&' } else { '?' };
        format!("{}{joiner}{query}", self.server_url)
    }

    fn map_error(&self, e: reqwest::Error) -> ChannelError {
        if e.is_timeout() {
            warn!("Request timeout after {}ms", self.timeout.as_millis());
            ChannelError::timeout(self.timeout.as_millis() as u64)
        } else {
            error!("Request failed: {}", e);
            ChannelError::transport(e.to_string())
        }
    }
}

impl Transport for HttpTransport {
    async fn exchange(&mut self, request: Request<'_>) -> Result<Bytes> {
        let url = self.url_for(request.query);
        trace!(url = %url, has_cookie = request.cookie.is_some(), "Sending request");

        let mut builder = self.client.get(&url);
        if let Some(cookie) = request.cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let mut response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(status = status.as_u16(), "Remote authority returned non-success status");
            return Err(ChannelError::ResponseStatus {
                status: status.as_u16(),
            });
        }

        let capacity = request.max_response;
        if let Some(size) = response.content_length() {
            if size > capacity as u64 {
                warn!(size, capacity, "Response body exceeds buffer capacity");
                return Err(ChannelError::ResponseTooLarge {
                    size: usize::try_from(size).unwrap_or(usize::MAX),
                    capacity,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            let size = body.len() + chunk.len();
            if size > capacity {
                warn!(size, capacity, "Response body exceeds buffer capacity");
                return Err(ChannelError::ResponseTooLarge { size, capacity });
            }
            body.extend_from_slice(&chunk);
        }

        trace!(len = body.len(), "Received response body");
        Ok(body.freeze())
    }
}
