use std::sync::Arc;
use std::time::Duration;

use portcullis_core::Identity;
use portcullis_hardware::{CredentialReader, Indicator, IndicatorState};
use portcullis_network::Transport;
use portcullis_protocol::{encode_reader_key, encode_record};
use portcullis_rfid::CredentialPipeline;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TerminalConfig;
use crate::error::{GateError, Result, TerminalError};
use crate::gate::{AcquireTimeout, GateGuard};
use crate::resources::{IndicatorPanel, SharedResources, hold_off};

/// Reads credentials, reports them and shows the verdict.
///
/// # Cycle
///
/// 1. Wait for a credential and read its record. A failed read is logged and
///    the task goes straight back to waiting, with no indication.
/// 2. Encode the record and exchange it over the channel gate.
/// 3. Show green for status 100, red for anything else, through the
///    indicator gate.
/// 4. If the exchange itself failed, show the double red flash instead.
///
/// Both indications take the indicator gate with the same bounded wait. If
/// the gate stays busy (the power monitor holds it during a battery warning)
/// the indication is skipped.
pub struct CredentialReportTask<R, T, I> {
    reader: R,
    pipeline: CredentialPipeline,
    identity: Arc<Identity>,
    resources: Arc<SharedResources<T, I>>,
    cancel: CancellationToken,
    channel_timeout: AcquireTimeout,
    indication: Indication,
}

impl<R, T, I> CredentialReportTask<R, T, I>
where
    R: CredentialReader,
    T: Transport,
    I: Indicator,
{
    pub fn new(
        reader: R,
        identity: Arc<Identity>,
        resources: Arc<SharedResources<T, I>>,
        config: &TerminalConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reader,
            pipeline: CredentialPipeline::new(config.first_block, config.block_key),
            identity,
            resources,
            cancel,
            channel_timeout: config.channel_acquire_timeout(),
            indication: Indication {
                timeout: config.indicator_acquire_timeout(),
                verdict_display: config.verdict_display(),
                flash_on: config.error_flash_on(),
                flash_off: config.error_flash_off(),
            },
        }
    }

    /// Run until cancelled.
    pub async fn run(mut self) -> Result<()> {
        info!("Credential report task started");
        loop {
            match self.cycle().await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => break,
                Err(e) => warn!(error = %e, "Credential cycle aborted"),
            }
        }
        info!("Credential report task stopped");
        Ok(())
    }

    async fn cycle(&mut self) -> Result<()> {
        let read = self
            .cancel
            .run_until_cancelled(
                self.pipeline
                    .log_credential(&mut self.reader, self.identity.reader_id()),
            )
            .await
            .ok_or(TerminalError::Cancelled)?;

        let record = match read {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, block = ?e.block(), "Credential read failed");
                return Ok(());
            }
        };
        info!(credential_id = %record.credential_id, "Credential read");

        let query = encode_record(&record, &self.identity);
        drop(record);
        let cookie = encode_reader_key(&self.identity);
        debug!(query = %query, "Reporting credential");

        let outcome = super::exchange(
            &self.resources,
            self.channel_timeout,
            &query,
            &cookie,
            &self.cancel,
        )
        .await;

        match outcome {
            Ok(status) => {
                let verdict = if status.is_access_granted() {
                    IndicatorState::Green
                } else {
                    IndicatorState::Red
                };
                info!(
                    code = %status.code,
                    message = %status.message,
                    %verdict,
                    "Access verdict"
                );
                self.indication
                    .verdict(&self.resources, verdict, &self.cancel)
                    .await
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                error!(error = %e, "Credential report failed");
                self.indication.error(&self.resources, &self.cancel).await
            }
        }
    }
}

/// Indicator settings for the credential task.
#[derive(Debug, Clone, Copy)]
struct Indication {
    timeout: AcquireTimeout,
    verdict_display: Duration,
    flash_on: Duration,
    flash_off: Duration,
}

impl Indication {
    async fn verdict<T, I: Indicator>(
        &self,
        resources: &SharedResources<T, I>,
        verdict: IndicatorState,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Some(mut panel) = self.take(resources, cancel).await? else {
            return Ok(());
        };
        panel.pulse(verdict, self.verdict_display, cancel).await
    }

    /// Two red flashes.
    async fn error<T, I: Indicator>(
        &self,
        resources: &SharedResources<T, I>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Some(mut panel) = self.take(resources, cancel).await? else {
            return Ok(());
        };
        panel.pulse(IndicatorState::Red, self.flash_on, cancel).await?;
        hold_off(self.flash_off, cancel).await?;
        panel.pulse(IndicatorState::Red, self.flash_on, cancel).await
    }

    /// Indicator gate with the bounded wait; `None` when it stayed busy.
    async fn take<'a, T, I>(
        &self,
        resources: &'a SharedResources<T, I>,
        cancel: &CancellationToken,
    ) -> Result<Option<GateGuard<'a, IndicatorPanel<I>>>> {
        match resources.indicator.acquire(self.timeout, cancel).await {
            Ok(panel) => Ok(Some(panel)),
            Err(e @ GateError::Timeout { .. }) => {
                warn!(error = %e, "Indicator busy, indication skipped");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
