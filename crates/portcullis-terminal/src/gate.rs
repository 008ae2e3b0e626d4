//! Mutual-exclusion gates over shared resources.
//!
//! A [`Gate`] owns the resource it guards, so the resource cannot be reached
//! without holding the gate. Acquisition always states a wait policy
//! ([`AcquireTimeout`]) and is raced against the terminal's cancellation
//! token. The gate is released when the [`GateGuard`] drops, which happens
//! exactly once on every exit path.
//!
//! Waiters are served in FIFO order. A holder that never lets go starves
//! everyone else; bounded waits turn that into a [`GateError::Timeout`].
//!
//! # Examples
//!
//! ```
//! use portcullis_terminal::gate::{AcquireTimeout, Gate};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let gate = Gate::new("counter", 0u32);
//!     let cancel = CancellationToken::new();
//!
//!     {
//!         let mut count = gate.acquire(AcquireTimeout::Unbounded, &cancel).await.unwrap();
//!         *count += 1;
//!         assert!(gate.is_held());
//!     }
//!     assert!(!gate.is_held());
//! }
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::GateError;

/// Wait policy for [`Gate::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireTimeout {
    /// Wait until the gate is free or shutdown is requested.
    Unbounded,

    /// Give up after the duration.
    Bounded(Duration),
}

impl AcquireTimeout {
    /// Policy from a millisecond setting where `0` means unbounded.
    ///
    /// ```
    /// use portcullis_terminal::gate::AcquireTimeout;
    /// use std::time::Duration;
    ///
    /// assert_eq!(AcquireTimeout::from_millis(0), AcquireTimeout::Unbounded);
    /// assert_eq!(
    ///     AcquireTimeout::from_millis(250),
    ///     AcquireTimeout::Bounded(Duration::from_millis(250))
    /// );
    /// ```
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Unbounded
        } else {
            Self::Bounded(Duration::from_millis(ms))
        }
    }
}

/// Binary lock owning a shared resource.
pub struct Gate<T> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T> Gate<T> {
    pub fn new(name: &'static str, resource: T) -> Self {
        Self {
            name,
            inner: Mutex::new(resource),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take the gate.
    ///
    /// # Errors
    ///
    /// - [`GateError::Timeout`] if a bounded wait elapses first
    /// - [`GateError::Cancelled`] if `cancel` fires first
    pub async fn acquire(
        &self,
        timeout: AcquireTimeout,
        cancel: &CancellationToken,
    ) -> Result<GateGuard<'_, T>, GateError> {
        let started = Instant::now();

        let guard = match timeout {
            AcquireTimeout::Unbounded => tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                guard = self.inner.lock() => Some(guard),
            },
            AcquireTimeout::Bounded(limit) => tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = tokio::time::timeout(limit, self.inner.lock()) => match result {
                    Ok(guard) => Some(guard),
                    Err(_) => {
                        return Err(GateError::Timeout {
                            gate: self.name,
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                },
            },
        };

        let Some(guard) = guard else {
            return Err(GateError::Cancelled { gate: self.name });
        };

        trace!(
            gate = self.name,
            waited_ms = started.elapsed().as_millis() as u64,
            "gate acquired"
        );
        Ok(GateGuard {
            gate: self.name,
            guard,
            acquired_at: Instant::now(),
        })
    }

    /// Take the gate only if it is free right now.
    pub fn try_acquire(&self) -> Option<GateGuard<'_, T>> {
        let guard = self.inner.try_lock().ok()?;
        Some(GateGuard {
            gate: self.name,
            guard,
            acquired_at: Instant::now(),
        })
    }

    /// True while some task holds the gate.
    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> fmt::Debug for Gate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("name", &self.name)
            .field("held", &self.is_held())
            .finish()
    }
}

/// Proof of holding a gate. Dereferences to the guarded resource.
pub struct GateGuard<'a, T> {
    gate: &'static str,
    guard: MutexGuard<'a, T>,
    acquired_at: Instant,
}

impl<T> GateGuard<'_, T> {
    pub fn gate(&self) -> &'static str {
        self.gate
    }

    /// How long the gate has been held.
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for GateGuard<'_, T> {
    fn drop(&mut self) {
        trace!(
            gate = self.gate,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "gate released"
        );
    }
}

impl<T> fmt::Debug for GateGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateGuard")
            .field("gate", &self.gate)
            .field("held_for", &self.held_for())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let gate = Gate::new("test", 1u8);
        let cancel = CancellationToken::new();

        let guard = gate
            .acquire(AcquireTimeout::Unbounded, &cancel)
            .await
            .unwrap();
        assert_eq!(*guard, 1);
        assert_eq!(guard.gate(), "test");
        assert!(gate.is_held());
        assert!(gate.try_acquire().is_none());

        drop(guard);
        assert!(!gate.is_held());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_timeout() {
        let gate = Gate::new("indicator", ());
        let cancel = CancellationToken::new();
        let _held = gate.try_acquire().unwrap();

        let err = gate
            .acquire(
                AcquireTimeout::Bounded(Duration::from_millis(2000)),
                &cancel,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GateError::Timeout {
                gate: "indicator",
                waited_ms: 2000
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting() {
        let gate = Arc::new(Gate::new("channel", ()));
        let cancel = CancellationToken::new();
        let held = gate.try_acquire().unwrap();

        let waiter = {
            let gate = Arc::clone(&gate);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                gate.acquire(AcquireTimeout::Unbounded, &cancel)
                    .await
                    .map(|_| ())
            })
        };

        tokio::time::sleep(Duration::from_secs(60)).await;
        cancel.cancel();

        let result = waiter.await.unwrap();
        assert_eq!(result, Err(GateError::Cancelled { gate: "channel" }));
        drop(held);
    }

    #[tokio::test]
    async fn test_cancelled_token_wins_over_free_gate() {
        let gate = Gate::new("channel", ());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = gate
            .acquire(AcquireTimeout::Unbounded, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, GateError::Cancelled { gate: "channel" });
        assert!(!gate.is_held());
    }

    #[test]
    fn test_from_millis() {
        assert_eq!(AcquireTimeout::from_millis(0), AcquireTimeout::Unbounded);
        assert_eq!(
            AcquireTimeout::from_millis(30_000),
            AcquireTimeout::Bounded(Duration::from_secs(30))
        );
    }
}
