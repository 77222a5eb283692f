//! The single shared queue view.
//!
//! Exactly one state container holds the merged queue: the refresh
//! scheduler writes snapshot-derived state through [`QueueView::apply_snapshot`]
//! and [`QueueView::observe_live`], the mutation coordinator writes
//! optimistic state through the mutation methods, and renderers watch the
//! published [`ViewSnapshot`]. Optimistic mutations rewrite the locally-held
//! snapshot, so the next pull from the store naturally restores server truth
//! without any diff-based repair.
//!
//! A new [`ViewSnapshot`] is published only when the partition shape, the
//! pending order, or the paused flag actually changed; progress wobble on a
//! running item reuses the existing `Arc` so downstream watchers have
//! nothing to re-render.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use fablecast_core::job::{LiveJobRecord, QueueItem};
use fablecast_core::reconcile::{reconcile, QueuePartitions};
use fablecast_core::CoreError;
use tokio::sync::watch;

use crate::live::LiveJobMap;

/// What renderers see: the merged partitions plus the pause affordance.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub partitions: Arc<QueuePartitions>,
    pub paused: bool,
}

struct Inner {
    /// Locally-held copy of the last applied store snapshot. Optimistic
    /// mutations edit this directly.
    snapshot: Vec<QueueItem>,
    /// Generation of `snapshot`, for last-writer-wins across racing pulls.
    applied_generation: u64,
    /// Latest push-delivered live map.
    live: LiveJobMap,
    /// Current merge result.
    partitions: Arc<QueuePartitions>,
    paused: bool,
}

/// Shared queue view state. Cheap to clone via `Arc<QueueView>`.
pub struct QueueView {
    inner: Mutex<Inner>,
    tx: watch::Sender<ViewSnapshot>,
    next_generation: AtomicU64,
}

impl QueueView {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot::default());
        Self {
            inner: Mutex::new(Inner {
                snapshot: Vec::new(),
                applied_generation: 0,
                live: LiveJobMap::default(),
                partitions: Arc::new(QueuePartitions::default()),
                paused: false,
            }),
            tx,
            next_generation: AtomicU64::new(1),
        }
    }

    /// Watch the published view. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    /// The currently published view.
    pub fn current(&self) -> ViewSnapshot {
        self.tx.borrow().clone()
    }

    /// Live record for one item, if the push feed currently carries it.
    pub fn live_record(&self, id: &str) -> Option<LiveJobRecord> {
        self.inner.lock().unwrap().live.get(id).cloned()
    }

    /// Allocate a generation for a pull about to be issued. Generations are
    /// handed out in request order, so a late response from an early pull
    /// can never overwrite a fresher snapshot.
    pub fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    // -----------------------------------------------------------------------
    // Snapshot-derived writes (refresh scheduler)
    // -----------------------------------------------------------------------

    /// Apply a fetched snapshot. Returns `false` when a newer snapshot has
    /// already been applied and this one is discarded.
    pub fn apply_snapshot(&self, snapshot: Vec<QueueItem>, generation: u64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if generation <= inner.applied_generation {
            tracing::debug!(
                generation,
                applied = inner.applied_generation,
                "Discarding superseded snapshot",
            );
            return false;
        }
        inner.snapshot = snapshot;
        inner.applied_generation = generation;
        self.remerge_locked(&mut inner);
        true
    }

    /// Record a new live map reference and recompute the merge.
    pub fn observe_live(&self, live: LiveJobMap) {
        let mut inner = self.inner.lock().unwrap();
        inner.live = live;
        self.remerge_locked(&mut inner);
    }

    // -----------------------------------------------------------------------
    // Optimistic writes (mutation coordinator)
    // -----------------------------------------------------------------------

    /// Replace the pending order. `order` must be an exact permutation of
    /// the currently queued ids; anything else is rejected before any state
    /// changes. Active and history partitions are untouched.
    pub fn set_pending_order(&self, order: &[String]) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().unwrap();

        let pending_ids = inner.partitions.pending_ids();
        let pending_set: HashSet<&str> = pending_ids.iter().map(String::as_str).collect();

        if order.len() != pending_ids.len() {
            return Err(CoreError::Validation(format!(
                "Reorder must list all {} pending items, got {}",
                pending_ids.len(),
                order.len()
            )));
        }
        let mut seen: HashSet<&str> = HashSet::with_capacity(order.len());
        for id in order {
            if !pending_set.contains(id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Reorder includes non-queued id: {id}"
                )));
            }
            if !seen.insert(id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Reorder lists id twice: {id}"
                )));
            }
        }

        // Reposition the queued items within the snapshot while leaving
        // every other item exactly where it was, preserving interleaving.
        let rebuilt: Vec<QueueItem> = {
            let queued: std::collections::HashMap<&str, QueueItem> = inner
                .snapshot
                .iter()
                .filter(|i| pending_set.contains(i.id.as_str()))
                .map(|i| (i.id.as_str(), i.clone()))
                .collect();

            let mut order_iter = order.iter();
            inner
                .snapshot
                .iter()
                .map(|item| {
                    if pending_set.contains(item.id.as_str()) {
                        let next_id = order_iter.next().expect("order length checked above");
                        queued[next_id.as_str()].clone()
                    } else {
                        item.clone()
                    }
                })
                .collect()
        };
        inner.snapshot = rebuilt;

        self.remerge_locked(&mut inner);
        Ok(())
    }

    /// Optimistically delete one item from whichever partition holds it.
    pub fn remove_item(&self, id: &str) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.snapshot.iter().any(|i| i.id == id) {
            return Err(CoreError::UnknownJob(id.to_string()));
        }
        inner.snapshot.retain(|i| i.id != id);
        self.remerge_locked(&mut inner);
        Ok(())
    }

    /// Flip the paused flag and return the new value.
    pub fn toggle_paused(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.paused = !inner.paused;
        let paused = inner.paused;
        self.publish_locked(&inner);
        paused
    }

    /// Revert a failed toggle, but only if the flag still holds the value
    /// that toggle wrote; a later toggle's optimistic state wins.
    pub fn revert_paused(&self, written: bool) {
        let mut inner = self.inner.lock().unwrap();
        if inner.paused == written {
            inner.paused = !written;
            self.publish_locked(&inner);
        }
    }

    pub fn paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    // -----------------------------------------------------------------------
    // Merge plumbing
    // -----------------------------------------------------------------------

    fn remerge_locked(&self, inner: &mut Inner) {
        let merged = reconcile(&inner.snapshot, &inner.live);
        if !merged.same_shape(&inner.partitions) {
            inner.partitions = Arc::new(merged);
            self.publish_locked(inner);
        }
    }

    fn publish_locked(&self, inner: &Inner) {
        self.tx.send_replace(ViewSnapshot {
            partitions: inner.partitions.clone(),
            paused: inner.paused,
        });
    }
}

impl Default for QueueView {
    fn default() -> Self {
        Self::new()
    }
}
