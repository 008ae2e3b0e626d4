pub mod constants;
pub mod error;
pub mod key;
pub mod types;

pub use error::{Error, Result};
pub use key::derive_reader_key;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
