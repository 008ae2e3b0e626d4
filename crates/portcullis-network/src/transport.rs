use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// One outbound request.
///
/// `query` is the encoded field list without the leading `?`. The optional
/// `cookie` is sent verbatim as the cookie header value. A body longer than
/// `max_response` bytes is rejected with
/// [`ChannelError::ResponseTooLarge`](crate::ChannelError::ResponseTooLarge)
/// before it is buffered in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub query: &'a str,
    pub cookie: Option<&'a str>,
    pub max_response: usize,
}

impl<'a> Request<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            cookie: None,
            max_response: usize::MAX,
        }
    }

    pub fn with_cookie(mut self, cookie: &'a str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn with_max_response(mut self, max_response: usize) -> Self {
        self.max_response = max_response;
        self
    }
}

/// Moves one request to the remote authority and returns the raw body.
///
/// Implementations do not retry and do not interpret the body.
pub trait Transport: Send {
    /// Perform one request/response round-trip.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`](crate::ChannelError) if the request cannot
    /// be delivered or the response is not a success.
    fn exchange(&mut self, request: Request<'_>) -> impl Future<Output = Result<Bytes>> + Send;
}
