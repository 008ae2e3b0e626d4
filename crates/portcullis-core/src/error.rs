use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Key derivation errors (fatal at startup)
    #[error("Reader key setup failed: {0}")]
    KeySetupFailed(String),

    #[error("Reader key input rejected: {0}")]
    KeyInputRejected(String),

    // Identifier errors
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

pub type Result<T> = std::result::Result<T, Error>;
