//! Snapshot refresh scheduling.
//!
//! Four triggers pull a fresh snapshot: the initial mount, an external
//! refresh request (also used by mutation failure paths), any live-map
//! replacement (which additionally recomputes the merge locally before the
//! network round-trip), and a low-frequency safety-net interval against a
//! missed push. Pulls are spawned and generation-tagged; the view keeps
//! whichever snapshot is freshest, so racing responses are harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::live::LiveJobMap;
use crate::store::QueueStore;
use crate::view::QueueView;

/// Handle for requesting an out-of-cycle snapshot pull.
///
/// Cloneable; the application signals "something relevant happened
/// elsewhere" through it, and the mutation coordinator uses it to re-derive
/// truth after a failed optimistic mutation.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshHandle {
    pub fn new() -> (Self, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Request a pull. Requests coalesce: the scheduler observes the latest
    /// trigger value, not every increment.
    pub fn request(&self) {
        self.tx.send_modify(|n| *n += 1);
    }
}

/// Drives when the view re-pulls the store snapshot.
pub struct RefreshScheduler<S: QueueStore> {
    store: Arc<S>,
    view: Arc<QueueView>,
    live_rx: watch::Receiver<LiveJobMap>,
    trigger_rx: watch::Receiver<u64>,
    poll_interval: Duration,
}

impl<S: QueueStore> RefreshScheduler<S> {
    pub fn new(
        store: Arc<S>,
        view: Arc<QueueView>,
        live_rx: watch::Receiver<LiveJobMap>,
        trigger_rx: watch::Receiver<u64>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            view,
            live_rx,
            trigger_rx,
            poll_interval,
        }
    }

    /// Run until cancelled. The first interval tick fires immediately and
    /// doubles as the on-mount pull.
    pub async fn run(self, cancel: CancellationToken) {
        let Self {
            store,
            view,
            mut live_rx,
            mut trigger_rx,
            poll_interval,
        } = self;

        let mut ticker = tokio::time::interval(poll_interval);
        tracing::debug!(
            poll_interval_secs = poll_interval.as_secs(),
            "Refresh scheduler started",
        );

        // Seed the merge with whatever the live feed already holds.
        view.observe_live(live_rx.borrow_and_update().clone());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Refresh scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    spawn_pull(&store, &view, &cancel);
                }
                changed = trigger_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    trigger_rx.borrow_and_update();
                    spawn_pull(&store, &view, &cancel);
                }
                changed = live_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Surface the transition immediately through a local
                    // re-merge, then confirm against the store.
                    let map = live_rx.borrow_and_update().clone();
                    view.observe_live(map);
                    spawn_pull(&store, &view, &cancel);
                }
            }
        }
    }
}

/// Issue one generation-tagged pull without blocking the trigger loop.
/// A response arriving after cancellation is dropped on the floor.
fn spawn_pull<S: QueueStore>(store: &Arc<S>, view: &Arc<QueueView>, cancel: &CancellationToken) {
    let generation = view.next_generation();
    let store = store.clone();
    let view = view.clone();
    let cancel = cancel.clone();

    tokio::spawn(async move {
        match store.fetch_snapshot().await {
            Ok(items) => {
                if cancel.is_cancelled() {
                    tracing::debug!(generation, "Dropping fetch response after shutdown");
                    return;
                }
                view.apply_snapshot(items, generation);
            }
            Err(e) => {
                // Transient; the next trigger or interval retries.
                tracing::warn!(generation, error = %e, "Snapshot pull failed");
            }
        }
    });
}
