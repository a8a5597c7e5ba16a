//! Shared UI state slices with change notification.
//!
//! `StateSlice<T>` holds one piece of UI-visible state (the saved payment
//! methods, the current profile) in a `watch` channel, so screens can read it
//! synchronously and subscribers are woken on every change, including an
//! optimistic proposal and its rollback.
//!
//! Writes go through two doors only: [`confirm`](StateSlice::confirm) for
//! fresh server loads, and the optimistic mutator, which holds the slice's
//! single in-flight slot while its transaction lives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// A named, shared piece of UI state.
pub struct StateSlice<T> {
    inner: Arc<SliceInner<T>>,
}

struct SliceInner<T> {
    name: String,
    value_tx: watch::Sender<T>,
    in_flight: AtomicBool,
}

/// Receives every value a [`StateSlice`] takes.
pub struct SliceWatcher<T> {
    value_rx: watch::Receiver<T>,
}

// -- StateSlice ---------------------------------------------------------

impl<T> StateSlice<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        let (value_tx, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SliceInner {
                name: name.into(),
                value_tx,
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current visible value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.value_tx.borrow().clone()
    }

    /// Whether an optimistic transaction is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Store a value freshly loaded from the server.
    ///
    /// Ignored while a transaction is in flight, so a slow load cannot
    /// clobber a proposal (or the reconciliation that follows it). Returns
    /// whether the value was stored.
    pub fn confirm(&self, value: T) -> bool {
        // Checked under the channel's write lock: a transaction claims the
        // slot before it snapshots, so it either sees this value or this
        // call sees the claim.
        let in_flight = &self.inner.in_flight;
        let stored = self.inner.value_tx.send_if_modified(|current| {
            if in_flight.load(Ordering::Acquire) {
                return false;
            }
            *current = value;
            true
        });
        if !stored {
            tracing::debug!(slice = %self.name(), "Skipping load result, mutation in flight");
        }
        stored
    }

    pub fn subscribe(&self) -> SliceWatcher<T> {
        SliceWatcher {
            value_rx: self.inner.value_tx.subscribe(),
        }
    }

    /// Claim the in-flight slot. Fails if another transaction holds it.
    pub(crate) fn try_claim(&self) -> bool {
        self.inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.inner.in_flight.store(false, Ordering::Release);
    }

    /// Unconditional write, reserved for the slot holder.
    pub(crate) fn replace(&self, value: T) {
        self.inner.value_tx.send_replace(value);
    }
}

impl<T> Clone for StateSlice<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StateSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSlice")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value_tx.borrow())
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

// -- SliceWatcher -------------------------------------------------------

impl<T: Clone> SliceWatcher<T> {
    /// Wait for the next change and return the new value.
    ///
    /// Returns `None` once every handle to the slice has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.value_rx.changed().await.ok()?;
        Some(self.value_rx.borrow_and_update().clone())
    }

    pub fn current(&self) -> T {
        self.value_rx.borrow().clone()
    }
}
