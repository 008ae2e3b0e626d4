//! Terminal startup and shutdown.
//!
//! [`Terminal::start`] logs the identity, runs the indicator self-test and
//! spawns the three tasks. The returned [`TerminalHandle`] is the only way
//! to stop them.
//!
//! ```text
//!                  ┌──────────────────┐
//!  reader ────────►│ credential task  │──┐
//!                  └──────────────────┘  │    ┌──────────────┐
//!                  ┌──────────────────┐  ├───►│ channel gate │──► Channel ──► remote authority
//!                  │ liveness task    │──┘    └──────────────┘
//!                  └──────────────────┘
//!                  ┌──────────────────┐       ┌────────────────┐
//!  power sensor ──►│ power monitor    │──────►│ indicator gate │──► indicator
//!                  └──────────────────┘  ┌───►└────────────────┘
//!                   credential task ─────┘
//! ```
//!
//! # Examples
//!
//! ```
//! use portcullis_core::{Identity, ReaderId};
//! use portcullis_hardware::mock::{MockCredentialReader, MockIndicator, MockPowerSensor};
//! use portcullis_network::mock::MockTransport;
//! use portcullis_terminal::{Peripherals, Terminal, TerminalConfig};
//!
//! #[tokio::main]
//! async fn main() -> portcullis_terminal::Result<()> {
//!     let identity = Identity::derive(ReaderId::default(), b"boot seed").unwrap();
//!     let (reader, _reader_handle) = MockCredentialReader::new();
//!     let (indicator, _indicator_handle) = MockIndicator::new();
//!     let (power, _power_handle) = MockPowerSensor::new();
//!     let (transport, _transport_handle) = MockTransport::new();
//!
//!     let terminal = Terminal::new(
//!         identity,
//!         TerminalConfig::default(),
//!         Peripherals { reader, indicator, power },
//!         transport,
//!     );
//!     let handle = terminal.start().await?;
//!
//!     let report = handle.shutdown().await;
//!     assert_eq!(report.completed, 3);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use portcullis_core::Identity;
use portcullis_hardware::{CredentialReader, Indicator, IndicatorState, PowerSensor};
use portcullis_network::{Channel, Transport};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::TerminalConfig;
use crate::error::{Result, TerminalError};
use crate::gate::AcquireTimeout;
use crate::resources::SharedResources;
use crate::tasks::{CredentialReportTask, LivenessReportTask, PowerMonitorTask};

/// The peripheral devices owned by the terminal.
#[derive(Debug)]
pub struct Peripherals<R, I, P> {
    pub reader: R,
    pub indicator: I,
    pub power: P,
}

/// A configured terminal, ready to start.
pub struct Terminal<R, I, P, T> {
    identity: Arc<Identity>,
    config: TerminalConfig,
    peripherals: Peripherals<R, I, P>,
    transport: T,
}

impl<R, I, P, T> Terminal<R, I, P, T>
where
    R: CredentialReader + 'static,
    I: Indicator + 'static,
    P: PowerSensor + 'static,
    T: Transport + 'static,
{
    /// Assemble a terminal. The identity is fixed from here on.
    pub fn new(
        identity: Identity,
        config: TerminalConfig,
        peripherals: Peripherals<R, I, P>,
        transport: T,
    ) -> Self {
        Self {
            identity: Arc::new(identity),
            config,
            peripherals,
            transport,
        }
    }

    /// Validate the configuration, run the self-test and spawn the tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Config`](crate::TerminalError::Config) for an
    /// invalid configuration, or one whose `reader_id` differs from the
    /// identity's. Nothing is spawned in that case.
    pub async fn start(self) -> Result<TerminalHandle> {
        self.config.validate()?;
        if self.config.reader_id != *self.identity.reader_id() {
            return Err(TerminalError::config(format!(
                "reader_id {} does not match the identity's reader {}",
                self.config.reader_id,
                self.identity.reader_id()
            )));
        }

        let Self {
            identity,
            config,
            peripherals,
            transport,
        } = self;

        info!(
            reader_id = %identity.reader_id(),
            key_fingerprint = %identity.reader_key().fingerprint(),
            server_url = %config.server_url,
            "Terminal identity"
        );

        let channel = Channel::with_limits(
            transport,
            config.max_response_bytes,
            config.request_timeout(),
        );
        let resources = Arc::new(SharedResources::new(channel, peripherals.indicator));
        let cancel = CancellationToken::new();

        if let Some(duration) = config.self_test() {
            self_test(&resources, duration, &cancel).await;
        }

        let mut tasks = JoinSet::new();

        let credential = CredentialReportTask::new(
            peripherals.reader,
            Arc::clone(&identity),
            Arc::clone(&resources),
            &config,
            cancel.clone(),
        );
        tasks.spawn(
            credential
                .run()
                .instrument(info_span!("task", name = "credential")),
        );

        let liveness = LivenessReportTask::new(
            Arc::clone(&identity),
            Arc::clone(&resources),
            &config,
            cancel.clone(),
        );
        tasks.spawn(
            liveness
                .run()
                .instrument(info_span!("task", name = "liveness")),
        );

        let power = PowerMonitorTask::new(
            peripherals.power,
            Arc::clone(&resources),
            &config,
            cancel.clone(),
        );
        tasks.spawn(power.run().instrument(info_span!("task", name = "power")));

        info!(tasks = tasks.len(), "Terminal started");
        Ok(TerminalHandle { cancel, tasks })
    }
}

/// Green blink through the indicator gate.
async fn self_test<T, I: Indicator>(
    resources: &SharedResources<T, I>,
    duration: Duration,
    cancel: &CancellationToken,
) {
    let timeout = AcquireTimeout::Bounded(duration.max(Duration::from_secs(1)));
    match resources.indicator.acquire(timeout, cancel).await {
        Ok(mut panel) => {
            if let Err(e) = panel.pulse(IndicatorState::Green, duration, cancel).await {
                warn!(error = %e, "Indicator self-test failed");
            }
        }
        Err(e) => warn!(error = %e, "Indicator self-test skipped"),
    }
}

/// Counts of how the tasks ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that observed cancellation and returned.
    pub completed: usize,
    /// Tasks that returned an error.
    pub failed: usize,
    /// Tasks that panicked.
    pub panicked: usize,
    /// Tasks aborted from outside.
    pub aborted: usize,
}

/// Handle to the running terminal.
pub struct TerminalHandle {
    cancel: CancellationToken,
    tasks: JoinSet<Result<()>>,
}

impl TerminalHandle {
    /// Token that stops the terminal when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop every task and wait for all of them to finish.
    ///
    /// Each task observes the cancellation at its current suspension point,
    /// releases any gate it holds and returns.
    pub async fn shutdown(mut self) -> ShutdownReport {
        info!("Shutting down terminal");
        self.cancel.cancel();

        let mut report = ShutdownReport::default();
        while let Some(result) = self.tasks.join_next().await {
            match classify_task_result(result) {
                TaskTermination::Success => report.completed += 1,
                TaskTermination::Error => report.failed += 1,
                TaskTermination::Cancelled => report.aborted += 1,
                TaskTermination::Panic => report.panicked += 1,
            }
        }

        if report.failed + report.panicked > 0 {
            error!(?report, "Terminal stopped with task failures");
        } else {
            info!(?report, "Terminal stopped");
        }
        report
    }
}

/// Classify the termination status of a task.
fn classify_task_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> TaskTermination {
    match result {
        Ok(Ok(())) => TaskTermination::Success,
        Ok(Err(e)) => {
            error!(error = %e, "Task ended with error");
            TaskTermination::Error
        }
        Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
        Err(e) => {
            error!(error = %e, "Task panicked");
            TaskTermination::Panic
        }
    }
}

/// Task termination classification for shutdown handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    /// Task returned after observing cancellation.
    Success,
    /// Task returned an error.
    Error,
    /// Task was aborted.
    Cancelled,
    /// Task panicked.
    Panic,
}
