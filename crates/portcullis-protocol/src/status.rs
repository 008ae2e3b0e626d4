//! Status response decoding.
//!
//! The remote authority answers every report with `<code> <message>`, for
//! example `100 Access granted`. Some deployments wrap the line in a JSON
//! string (`"100 Access granted"`), so one pair of surrounding double quotes
//! is removed before parsing. Trailing line terminators are ignored.
//!
//! Decoding fails with [`ProtocolError::Malformed`] when:
//! - the text is shorter than [`MIN_STATUS_LEN`]
//! - it does not start with a digit sequence
//! - the digit sequence is not immediately followed by a space
//!
//! Callers that must carry on regardless use [`StatusResponse::from_body`],
//! which substitutes [`StatusCode::Unparsed`] and a placeholder message.

use std::fmt;

use portcullis_core::constants::{
    MIN_STATUS_LEN, STATUS_ACCESS_GRANTED, STATUS_LIVENESS_ACK, UNREADABLE_RESPONSE_MESSAGE,
};
use tracing::warn;

use crate::{ProtocolError, Result};

/// Status code carried by a response.
///
/// `Unparsed` is distinct from every numeric code, including `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Code decoded from the response.
    Parsed(u32),

    /// The response could not be decoded.
    Unparsed,
}

impl StatusCode {
    /// Numeric value, if the code was decoded.
    #[must_use]
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Parsed(code) => Some(code),
            Self::Unparsed => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(code) => write!(f, "{code}"),
            Self::Unparsed => f.write_str("unparsed"),
        }
    }
}

/// A decoded status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub code: StatusCode,
    pub message: String,
}

impl StatusResponse {
    /// Response used in place of one that could not be decoded.
    #[must_use]
    pub fn unparsed() -> Self {
        Self {
            code: StatusCode::Unparsed,
            message: UNREADABLE_RESPONSE_MESSAGE.to_string(),
        }
    }

    /// Decode `text`, falling back to [`StatusResponse::unparsed`] on failure.
    #[must_use]
    pub fn from_body(text: &str) -> Self {
        decode_status(text).unwrap_or_else(|e| {
            warn!(error = %e, body = %text, "Substituting placeholder for undecodable status");
            Self::unparsed()
        })
    }

    /// `true` only for a decoded code of 100.
    #[must_use]
    pub fn is_access_granted(&self) -> bool {
        self.code == StatusCode::Parsed(STATUS_ACCESS_GRANTED)
    }

    /// `true` only for a decoded code of 200.
    #[must_use]
    pub fn is_liveness_ack(&self) -> bool {
        self.code == StatusCode::Parsed(STATUS_LIVENESS_ACK)
    }
}

impl fmt::Display for StatusResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Decode a `<code> <message>` status line.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if the text is too short, has no
/// leading digits, or the digits are not followed by a space.
///
/// # Examples
///
/// ```
/// use portcullis_protocol::{StatusCode, decode_status};
///
/// let response = decode_status("403 Denied").unwrap();
/// assert_eq!(response.code, StatusCode::Parsed(403));
/// assert_eq!(response.message, "Denied");
///
/// assert!(decode_status("OK").is_err());
/// ```
pub fn decode_status(text: &str) -> Result<StatusResponse> {
    let text = text.trim_end_matches(['\r', '\n']);

    if text.len() < MIN_STATUS_LEN {
        return Err(ProtocolError::malformed(format!(
            "response too short ({} < {MIN_STATUS_LEN})",
            text.len()
        )));
    }

    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits_end == 0 {
        return Err(ProtocolError::malformed("no leading status code"));
    }

    let (digits, rest) = text.split_at(digits_end);
    let message = rest
        .strip_prefix(' ')
        .ok_or_else(|| ProtocolError::malformed("status code not followed by a space"))?;

    let code = digits
        .parse::<u32>()
        .map_err(|e| ProtocolError::malformed(format!("status code out of range: {e}")))?;

    Ok(StatusResponse {
        code: StatusCode::Parsed(code),
        message: message.to_string(),
    })
}
