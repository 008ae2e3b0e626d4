//! Control core of the portcullis access terminal.
//!
//! Three tasks run concurrently and share two resources:
//!
//! - **Credential report**: read a credential, report it, show the verdict
//! - **Liveness report**: tell the remote authority the reader is alive
//! - **Power monitor**: hold the indicator orange while the battery is
//!   critical and external power is absent
//!
//! The communication channel and the indicator are each guarded by a
//! [`Gate`](gate::Gate). Every gate acquisition states its wait policy, and
//! every suspension point observes a shared cancellation token so the
//! terminal shuts down cleanly.
//!
//! # Modules
//!
//! - [`gate`]: mutual exclusion with bounded or unbounded, cancellable waits
//! - [`resources`]: the gated channel and indicator
//! - [`power`]: battery warning hysteresis
//! - [`tasks`]: the three task loops
//! - [`orchestrator`]: startup, self-test and shutdown
//! - [`config`]: terminal configuration

pub mod config;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod power;
pub mod resources;
pub mod tasks;

pub use config::TerminalConfig;
pub use error::{GateError, Result, TerminalError};
pub use orchestrator::{Peripherals, ShutdownReport, Terminal, TerminalHandle};
