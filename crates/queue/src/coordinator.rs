//! Optimistic operator mutations.
//!
//! Every operation follows the same shape: validate, apply locally, issue
//! the persistence call, and on failure forget the local delta by requesting
//! a fresh snapshot pull. No fine-grained diff repair; the next snapshot is
//! truth.

use std::sync::Arc;
use std::time::Duration;

use fablecast_core::CoreError;
use tokio::sync::mpsc;

use crate::scheduler::RefreshHandle;
use crate::store::{QueueStore, StoreError};
use crate::view::QueueView;

/// Coordinates operator actions against the shared view and the store.
///
/// This is the only writer of optimistic state; the refresh scheduler is the
/// only writer of snapshot-derived state.
pub struct MutationCoordinator<S: QueueStore> {
    store: Arc<S>,
    view: Arc<QueueView>,
    refresh: RefreshHandle,
    reorder_tx: mpsc::UnboundedSender<Vec<String>>,
    pause_tx: mpsc::UnboundedSender<bool>,
}

impl<S: QueueStore> MutationCoordinator<S> {
    /// Create the coordinator and spawn its reorder and pause workers.
    ///
    /// Both workers are detached tasks on purpose: a reorder pending when the
    /// queue view unmounts is still issued, and their failure-path refresh
    /// requests are simply ignored once no scheduler is listening.
    pub fn new(
        store: Arc<S>,
        view: Arc<QueueView>,
        refresh: RefreshHandle,
        reorder_debounce: Duration,
    ) -> Self {
        let (reorder_tx, reorder_rx) = mpsc::unbounded_channel();
        spawn_reorder_worker(
            store.clone(),
            refresh.clone(),
            reorder_debounce,
            reorder_rx,
        );

        let (pause_tx, pause_rx) = mpsc::unbounded_channel();
        spawn_pause_worker(store.clone(), view.clone(), refresh.clone(), pause_rx);

        Self {
            store,
            view,
            refresh,
            reorder_tx,
            pause_tx,
        }
    }

    /// Replace the pending order.
    ///
    /// The local view updates immediately; the persistence call is debounced
    /// so a burst of drag gestures collapses into one call carrying only the
    /// final order. Rejected before any mutation if `order` is not an exact
    /// permutation of the currently queued ids.
    pub fn reorder(&self, order: Vec<String>) -> Result<(), CoreError> {
        self.view.set_pending_order(&order)?;
        // Worker gone means shutdown is underway; the optimistic view will
        // be discarded with everything else.
        let _ = self.reorder_tx.send(order);
        Ok(())
    }

    /// Optimistically delete one item, then confirm against the store.
    pub fn remove(&self, id: &str) -> Result<(), CoreError> {
        self.view.remove_item(id)?;

        let store = self.store.clone();
        let refresh = self.refresh.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.persist_remove(&id).await {
                tracing::warn!(job_id = %id, error = %e, "Remove failed; re-syncing from snapshot");
                refresh.request();
            }
        });
        Ok(())
    }

    /// Bulk-delete everything, then refresh from the store.
    ///
    /// Deliberately not optimistic: a wrong local clear silently hiding a
    /// running job is worse than a brief delay.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let result = self.store.persist_clear_all().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Clear-all failed");
        }
        self.refresh.request();
        result
    }

    /// Bulk-delete terminal items, then refresh from the store.
    pub async fn clear_completed(&self) -> Result<(), StoreError> {
        let result = self.store.persist_clear_completed().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Clear-completed failed");
        }
        self.refresh.request();
        result
    }

    /// Flip the pause flag immediately and issue the matching call.
    ///
    /// Calls are queued to a single worker so rapid toggles hit the store in
    /// flip order even on a multi-thread runtime; a second toggle before the
    /// first resolves observes the already-optimistic value. A failed call
    /// reverts its own flip only if no later toggle has superseded it, and
    /// requests a re-sync either way.
    pub fn toggle_pause(&self) {
        let paused = self.view.toggle_paused();
        // As with reorder, a dropped worker means shutdown is underway.
        let _ = self.pause_tx.send(paused);
    }
}

/// Reset-style debounce: each new order restarts the quiet period, and only
/// the last order received before it elapses is persisted.
fn spawn_reorder_worker<S: QueueStore>(
    store: Arc<S>,
    refresh: RefreshHandle,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Vec<String>>,
) {
    tokio::spawn(async move {
        while let Some(first) = rx.recv().await {
            let mut pending = first;
            loop {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(order) => pending = order,
                        // Sender dropped mid-debounce: fall through and
                        // still issue the pending call.
                        None => break,
                    },
                    _ = tokio::time::sleep(debounce) => break,
                }
            }

            if let Err(e) = store.persist_reorder(&pending).await {
                tracing::warn!(error = %e, "Reorder persistence failed; re-syncing from snapshot");
                refresh.request();
            }
        }
    });
}

/// Issues pause/resume calls one at a time, in the order the flags were
/// flipped locally.
fn spawn_pause_worker<S: QueueStore>(
    store: Arc<S>,
    view: Arc<QueueView>,
    refresh: RefreshHandle,
    mut rx: mpsc::UnboundedReceiver<bool>,
) {
    tokio::spawn(async move {
        while let Some(paused) = rx.recv().await {
            let result = if paused {
                store.persist_pause().await
            } else {
                store.persist_resume().await
            };
            if let Err(e) = result {
                tracing::warn!(paused, error = %e, "Pause toggle failed; reverting");
                view.revert_paused(paused);
                refresh.request();
            }
        }
    });
}
