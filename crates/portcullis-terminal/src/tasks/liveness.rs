use std::sync::Arc;
use std::time::Duration;

use portcullis_core::Identity;
use portcullis_network::Transport;
use portcullis_protocol::{encode_liveness, encode_reader_key};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TerminalConfig;
use crate::error::Result;
use crate::gate::AcquireTimeout;
use crate::resources::SharedResources;

/// Periodic liveness report. Never touches the indicator.
pub struct LivenessReportTask<T, I> {
    identity: Arc<Identity>,
    resources: Arc<SharedResources<T, I>>,
    cancel: CancellationToken,
    interval: Duration,
    channel_timeout: AcquireTimeout,
}

impl<T: Transport, I: Send> LivenessReportTask<T, I> {
    pub fn new(
        identity: Arc<Identity>,
        resources: Arc<SharedResources<T, I>>,
        config: &TerminalConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            identity,
            resources,
            cancel,
            interval: config.liveness_interval(),
            channel_timeout: config.channel_acquire_timeout(),
        }
    }

    /// Run until cancelled.
    pub async fn run(self) -> Result<()> {
        info!(interval_ms = self.interval.as_millis() as u64, "Liveness report task started");

        let query = encode_liveness(&self.identity);
        let cookie = encode_reader_key(&self.identity);

        while self
            .cancel
            .run_until_cancelled(tokio::time::sleep(self.interval))
            .await
            .is_some()
        {
            let outcome = super::exchange(
                &self.resources,
                self.channel_timeout,
                &query,
                &cookie,
                &self.cancel,
            )
            .await;

            match outcome {
                Ok(status) if status.is_liveness_ack() => {
                    debug!(message = %status.message, "Liveness acknowledged");
                }
                Ok(status) => {
                    warn!(
                        code = %status.code,
                        message = %status.message,
                        "Liveness not acknowledged, reader may be unregistered"
                    );
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => error!(error = %e, "Liveness report failed"),
            }
        }

        info!("Liveness report task stopped");
        Ok(())
    }
}
