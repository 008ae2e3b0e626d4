//! Exchange boundary for the portcullis terminal.
//!
//! This crate moves encoded reports to the remote authority and brings the
//! status line back. It never retries and never interprets status codes;
//! both belong to the task that owns the exchange.
//!
//! # Components
//!
//! - [`Transport`]: one request/response round-trip, returning the raw body
//! - [`HttpTransport`]: `GET <server_url>?<query>` with the reader key cookie
//! - [`Channel`]: the shared channel; stages request and response in a
//!   bounded buffer, enforces the exchange timeout and decodes the status
//! - [`mock::MockTransport`]: scripted transport for tests and simulation
//!
//! # Architecture
//!
//! ```text
//! credential task ─┐
//!                  ├─> channel gate ─> Channel ─> Transport ───(HTTP)───> remote authority
//! liveness task  ──┘                      │
//!                                         └─> ChannelBuffer (request, then response)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use portcullis_network::{Channel, HttpTransport, HttpTransportConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new(HttpTransportConfig {
//!     server_url: "http://192.168.0.100:8080/access".to_string(),
//!     timeout: Duration::from_millis(3000),
//! })?;
//!
//! let mut channel = Channel::new(transport);
//! let status = channel.exchange("rid=0x1234567812345678", None).await?;
//! println!("Remote authority answered {status}");
//! # Ok(())
//! # }
//! ```

mod channel;
mod error;
mod http;
pub mod mock;
mod transport;

pub use channel::Channel;
pub use error::{ChannelError, Result};
pub use http::{HttpTransport, HttpTransportConfig};
pub use transport::{Request, Transport};
