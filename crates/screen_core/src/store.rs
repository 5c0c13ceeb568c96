//! Latest-value state store with replay-on-subscribe fan-out.
//!
//! The store keeps exactly one retained value. Each observer owns a private
//! queue that only holds values it has not consumed yet; nothing older than
//! the current value is kept for late subscribers.

use std::{
    collections::BTreeMap,
    pin::Pin,
    sync::{Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use futures::{Stream, StreamExt};
use shared::error::StoreError;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

pub struct StateStore<S> {
    inner: Mutex<StoreState<S>>,
}

struct StoreState<S> {
    current: Option<S>,
    closed: bool,
    next_observer_id: u64,
    observers: BTreeMap<u64, mpsc::UnboundedSender<S>>,
}

impl<S: Clone> StoreState<S> {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Hands `state` to every live observer in attach order, pruning the ones
    /// whose receiving half is gone.
    fn publish(&mut self, state: S) {
        self.observers
            .retain(|_, sender| sender.send(state.clone()).is_ok());
        self.current = Some(state);
    }
}

impl<S: Clone + Send + 'static> StateStore<S> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreState {
                current: None,
                closed: false,
                next_observer_id: 1,
                observers: BTreeMap::new(),
            }),
        }
    }

    pub fn with_initial(state: S) -> Self {
        let store = Self::new();
        store.lock_state().current = Some(state);
        store
    }

    /// Stores `state` as the current value and wakes every observer.
    ///
    /// Fails with [`StoreError::Closed`] once [`StateStore::close`] ran.
    pub fn commit(&self, state: S) -> Result<(), StoreError> {
        let mut guard = self.lock_state();
        guard.ensure_open()?;
        guard.publish(state);
        Ok(())
    }

    /// Read-modify-commit under the store lock. A `None` from `f` leaves the
    /// store untouched and notifies nobody.
    pub fn update<F>(&self, f: F) -> Result<Option<S>, StoreError>
    where
        F: FnOnce(Option<&S>) -> Option<S>,
    {
        let mut guard = self.lock_state();
        guard.ensure_open()?;
        let Some(next) = f(guard.current.as_ref()) else {
            return Ok(None);
        };
        guard.publish(next.clone());
        Ok(Some(next))
    }

    /// Commits every value returned by `f` back-to-back. No other commit can
    /// land between them, so observers always see the whole run in order.
    pub fn update_sequence<F>(&self, f: F) -> Result<usize, StoreError>
    where
        F: FnOnce(Option<&S>) -> Vec<S>,
    {
        let mut guard = self.lock_state();
        guard.ensure_open()?;
        let states = f(guard.current.as_ref());
        let committed = states.len();
        for state in states {
            guard.publish(state);
        }
        Ok(committed)
    }

    /// Subscribes to the store. The current value, if any, is delivered first,
    /// followed by every later commit. On a closed store the stream is
    /// already finished.
    pub fn observe(&self) -> StateStream<S> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut guard = self.lock_state();
        if !guard.closed {
            if let Some(current) = &guard.current {
                let _ = sender.send(current.clone());
            }
            let id = guard.next_observer_id;
            guard.next_observer_id = guard.next_observer_id.saturating_add(1);
            guard.observers.insert(id, sender);
            debug!(observer_id = id, "state observer attached");
        }

        StateStream {
            inner: UnboundedReceiverStream::new(receiver),
        }
    }

    pub fn current(&self) -> Option<S> {
        self.lock_state().current.clone()
    }

    /// Ends every observer stream. Values already queued are still drained by
    /// their observers; nothing is accepted afterwards. Idempotent.
    pub fn close(&self) {
        let mut guard = self.lock_state();
        if guard.closed {
            return;
        }
        guard.closed = true;
        let detached = guard.observers.len();
        guard.observers.clear();
        debug!(observers = detached, "state store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    pub fn observer_count(&self) -> usize {
        self.lock_state()
            .observers
            .values()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    // Writes only happen after user closures return, so a poisoned guard
    // still holds a consistent snapshot.
    fn lock_state(&self) -> MutexGuard<'_, StoreState<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Clone + Send + 'static> Default for StateStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live view of a [`StateStore`]. Ends when the store is closed or dropped.
pub struct StateStream<S> {
    inner: UnboundedReceiverStream<S>,
}

impl<S> StateStream<S> {
    pub async fn next_state(&mut self) -> Option<S> {
        self.inner.next().await
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
