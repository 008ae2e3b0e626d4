//! The three terminal tasks.
//!
//! Each task is an endless loop that absorbs every error and starts its next
//! cycle. The only way out is the cancellation token, which every suspension
//! point observes.

mod credential;
mod liveness;
mod power;

pub use credential::CredentialReportTask;
pub use liveness::LivenessReportTask;
pub use power::PowerMonitorTask;

use portcullis_network::Transport;
use portcullis_protocol::StatusResponse;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TerminalError};
use crate::gate::AcquireTimeout;
use crate::resources::SharedResources;

/// One exchange over the shared channel, holding the channel gate only for
/// the duration of the exchange.
pub(crate) async fn exchange<T: Transport, I>(
    resources: &SharedResources<T, I>,
    timeout: AcquireTimeout,
    query: &str,
    cookie: &str,
    cancel: &CancellationToken,
) -> Result<StatusResponse> {
    let mut channel = resources.channel.acquire(timeout, cancel).await?;
    let status = cancel
        .run_until_cancelled(channel.exchange(query, Some(cookie)))
        .await
        .ok_or(TerminalError::Cancelled)??;
    Ok(status)
}
