//! Long-lived shared state of the terminal.
//!
//! Only two things are shared between tasks: the communication channel
//! (transport plus its staging buffer) and the indicator. Each lives inside
//! its own [`Gate`]; there is no other path to them.

use std::time::Duration;

use portcullis_hardware::{Indicator, IndicatorState};
use portcullis_network::Channel;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{Result, TerminalError};
use crate::gate::Gate;

pub const CHANNEL_GATE: &str = "channel";
pub const INDICATOR_GATE: &str = "indicator";

/// The indicator together with the state it was last driven to.
#[derive(Debug)]
pub struct IndicatorPanel<I> {
    indicator: I,
    state: IndicatorState,
}

impl<I: Indicator> IndicatorPanel<I> {
    pub fn new(indicator: I) -> Self {
        Self {
            indicator,
            state: IndicatorState::Off,
        }
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// Drive the indicator.
    ///
    /// # Errors
    ///
    /// Returns the peripheral error; the recorded state is left unchanged.
    pub async fn set(&mut self, state: IndicatorState) -> Result<()> {
        self.indicator.set(state).await?;
        trace!(%state, "indicator set");
        self.state = state;
        Ok(())
    }

    /// Show `state` for `duration`, then switch off.
    ///
    /// The indicator is switched off even when shutdown interrupts the wait.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Cancelled`] if `cancel` fired during the wait, or the
    /// peripheral error.
    pub async fn pulse(
        &mut self,
        state: IndicatorState,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.set(state).await?;
        let completed = cancel
            .run_until_cancelled(tokio::time::sleep(duration))
            .await
            .is_some();
        self.set(IndicatorState::Off).await?;

        if completed {
            Ok(())
        } else {
            Err(TerminalError::Cancelled)
        }
    }
}

/// Pause with the indicator untouched. The caller keeps holding the
/// indicator gate.
///
/// # Errors
///
/// [`TerminalError::Cancelled`] if `cancel` fired during the wait.
pub async fn hold_off(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    cancel
        .run_until_cancelled(tokio::time::sleep(duration))
        .await
        .ok_or(TerminalError::Cancelled)
}

/// Everything the three tasks share, each resource behind its gate.
#[derive(Debug)]
pub struct SharedResources<T, I> {
    pub channel: Gate<Channel<T>>,
    pub indicator: Gate<IndicatorPanel<I>>,
}

impl<T, I: Indicator> SharedResources<T, I> {
    pub fn new(channel: Channel<T>, indicator: I) -> Self {
        Self {
            channel: Gate::new(CHANNEL_GATE, channel),
            indicator: Gate::new(INDICATOR_GATE, IndicatorPanel::new(indicator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_hardware::mock::MockIndicator;

    #[tokio::test(start_paused = true)]
    async fn test_pulse_timing() {
        let (indicator, handle) = MockIndicator::new();
        let mut panel = IndicatorPanel::new(indicator);
        let cancel = CancellationToken::new();

        panel
            .pulse(IndicatorState::Green, Duration::from_millis(500), &cancel)
            .await
            .unwrap();

        let history = handle.history();
        assert_eq!(
            handle.states(),
            vec![IndicatorState::Green, IndicatorState::Off]
        );
        assert_eq!(history[1].at - history[0].at, Duration::from_millis(500));
        assert_eq!(panel.state(), IndicatorState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_cancelled_still_switches_off() {
        let (indicator, handle) = MockIndicator::new();
        let mut panel = IndicatorPanel::new(indicator);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = panel
            .pulse(IndicatorState::Red, Duration::from_secs(5), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(handle.current(), IndicatorState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_off_waits_then_observes_cancel() {
        let cancel = CancellationToken::new();
        let started = tokio::time::Instant::now();
        hold_off(Duration::from_millis(100), &cancel).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(100));

        cancel.cancel();
        let err = hold_off(Duration::from_secs(5), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
