//! Engine assembly: one owner for the view, its background loops, and the
//! mutation surface.
//!
//! `QueueEngine::start` spawns the refresh scheduler and the shared tick
//! clock under a single cancellation token; `shutdown` (or dropping the
//! engine) cancels both, so no timer survives the queue view being torn
//! down and no late fetch response touches unmounted state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::clock::TickClock;
use crate::config::EngineConfig;
use crate::coordinator::MutationCoordinator;
use crate::live::LiveJobMap;
use crate::scheduler::{RefreshHandle, RefreshScheduler};
use crate::store::QueueStore;
use crate::view::QueueView;

/// The assembled queue view engine.
pub struct QueueEngine<S: QueueStore> {
    view: Arc<QueueView>,
    clock: Arc<TickClock>,
    coordinator: MutationCoordinator<S>,
    refresh: RefreshHandle,
    cancel: CancellationToken,
}

impl<S: QueueStore> QueueEngine<S> {
    /// Wire everything up and start the background loops.
    pub fn start(
        store: Arc<S>,
        live_rx: watch::Receiver<LiveJobMap>,
        config: EngineConfig,
    ) -> Self {
        let view = Arc::new(QueueView::new());
        let (refresh, trigger_rx) = RefreshHandle::new();
        let coordinator = MutationCoordinator::new(
            store.clone(),
            view.clone(),
            refresh.clone(),
            config.reorder_debounce,
        );
        let clock = Arc::new(TickClock::new(config.tick_interval));
        let cancel = CancellationToken::new();

        let scheduler = RefreshScheduler::new(
            store,
            view.clone(),
            live_rx,
            trigger_rx,
            config.snapshot_poll_interval,
        );
        tokio::spawn({
            let token = cancel.child_token();
            async move { scheduler.run(token).await }
        });

        tokio::spawn({
            let clock = clock.clone();
            let token = cancel.child_token();
            async move { clock.run(token).await }
        });

        Self {
            view,
            clock,
            coordinator,
            refresh,
            cancel,
        }
    }

    /// The shared view; subscribe for partition/pause changes.
    pub fn view(&self) -> &Arc<QueueView> {
        &self.view
    }

    /// The shared display tick; cards subscribe while visible.
    pub fn clock(&self) -> &Arc<TickClock> {
        &self.clock
    }

    /// Operator mutation surface.
    pub fn coordinator(&self) -> &MutationCoordinator<S> {
        &self.coordinator
    }

    /// Handle for out-of-cycle refresh requests.
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh.clone()
    }

    /// Stop the background loops. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl<S: QueueStore> Drop for QueueEngine<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
