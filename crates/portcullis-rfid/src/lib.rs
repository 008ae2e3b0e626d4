//! Credential read pipeline.
//!
//! Turns one credential presentation into a complete [`CredentialRecord`]:
//! detect the credential, then authenticate and read each block of the
//! record in ascending order. The result is all-or-nothing. A record is
//! returned only when every block was read; otherwise the caller gets the
//! single failure that stopped the read.
//!
//! [`CredentialRecord`]: portcullis_core::CredentialRecord

pub mod error;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use pipeline::CredentialPipeline;
