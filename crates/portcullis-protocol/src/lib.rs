//! Wire codec for the portcullis terminal.
//!
//! Reports travel to the remote authority as a query string of hex-encoded
//! fields, and the authority answers with a short plaintext status line:
//!
//! ```text
//! request:  rid=0x1234567812345678&cid=0xaabbccdd&data=0x0001...1f
//! cookie:   rkey=0x<64 hex digits>
//! response: 100 Access granted
//! ```
//!
//! This crate provides:
//! - [`encode_field`], [`encode_record`], [`encode_liveness`], [`encode_reader_key`]:
//!   request encoding with sizes computed up front
//! - [`decode_status`] and [`StatusResponse`]: response decoding with a
//!   distinct [`StatusCode::Unparsed`] sentinel for malformed replies
//! - [`ChannelBuffer`]: the bounded staging buffer shared by every exchange

pub mod buffer;
pub mod error;
pub mod query;
pub mod status;

pub use buffer::ChannelBuffer;
pub use error::{ProtocolError, Result};
pub use query::{
    encode_field, encode_liveness, encode_reader_key, encode_record, encoded_field_len,
};
pub use status::{StatusCode, StatusResponse, decode_status};
