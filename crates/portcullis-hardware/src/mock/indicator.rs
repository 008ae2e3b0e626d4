//! Mock indicator that records every state it is driven to.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::Instant;

use crate::{Result, traits::Indicator, types::IndicatorState};

/// A state change observed by the mock indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorChange {
    pub state: IndicatorState,
    pub at: Instant,
}

/// Mock bicolor indicator.
///
/// Timestamps come from the Tokio clock, so tests running with paused time
/// see exact durations.
///
/// # Examples
///
/// ```
/// use portcullis_hardware::mock::MockIndicator;
/// use portcullis_hardware::traits::Indicator;
/// use portcullis_hardware::IndicatorState;
///
/// #[tokio::main]
/// async fn main() -> portcullis_hardware::Result<()> {
///     let (mut indicator, handle) = MockIndicator::new();
///     indicator.set(IndicatorState::Green).await?;
///     assert_eq!(handle.current(), IndicatorState::Green);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockIndicator {
    history: Arc<Mutex<Vec<IndicatorChange>>>,
}

impl MockIndicator {
    pub fn new() -> (Self, MockIndicatorHandle) {
        let history = Arc::new(Mutex::new(Vec::new()));
        let indicator = Self {
            history: Arc::clone(&history),
        };
        (indicator, MockIndicatorHandle { history })
    }
}

impl Default for MockIndicator {
    fn default() -> Self {
        Self::new().0
    }
}

impl Indicator for MockIndicator {
    async fn set(&mut self, state: IndicatorState) -> Result<()> {
        tracing::trace!(%state, "indicator");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(IndicatorChange {
                state,
                at: Instant::now(),
            });
        Ok(())
    }
}

/// Handle for inspecting a mock indicator.
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    history: Arc<Mutex<Vec<IndicatorChange>>>,
}

impl MockIndicatorHandle {
    /// Every change, oldest first.
    pub fn history(&self) -> Vec<IndicatorChange> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// States only, oldest first.
    pub fn states(&self) -> Vec<IndicatorState> {
        self.history().into_iter().map(|c| c.state).collect()
    }

    /// Last state driven, `Off` if never set.
    pub fn current(&self) -> IndicatorState {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map_or(IndicatorState::Off, |c| c.state)
    }

    pub fn clear(&self) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
