//! Queue engine demo: an in-memory store, a synthetic worker publishing
//! live progress, a scripted operator, and a render loop logging card state
//! on every display tick.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fablecast_core::job::{JobStatus, LiveJobRecord, QueueItem};
use fablecast_queue::{
    epoch_now, EngineConfig, JobCard, LiveFeed, QueueEngine, QueueStore, StoreError,
};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long the demo runs before shutting the engine down.
const DEMO_DURATION: Duration = Duration::from_secs(45);

/// How often the synthetic worker publishes a live progress step.
const WORKER_STEP: Duration = Duration::from_millis(400);

// ---------------------------------------------------------------------------
// Demo store
// ---------------------------------------------------------------------------

/// In-memory stand-in for the persistence layer.
struct DemoStore {
    items: Mutex<Vec<QueueItem>>,
}

impl DemoStore {
    fn seeded(chapters: usize) -> Self {
        let now = epoch_now();
        let items = (1..=chapters)
            .map(|n| {
                let mut item = QueueItem::new(
                    uuid::Uuid::now_v7().to_string(),
                    JobStatus::Queued,
                    now,
                );
                item.title = Some(format!("Chapter {n:02}"));
                item.eta_seconds = Some(8.0);
                item
            })
            .collect();
        Self {
            items: Mutex::new(items),
        }
    }

    /// Claim the first queued item, marking it running.
    fn claim_next(&self) -> Option<QueueItem> {
        let mut items = self.items.lock().unwrap();
        let item = items.iter_mut().find(|i| i.status == JobStatus::Queued)?;
        item.status = JobStatus::Running;
        item.started_at = Some(epoch_now());
        Some(item.clone())
    }

    fn finish(&self, id: &str) {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.status = JobStatus::Done;
            item.progress = 1.0;
            item.completed_at = Some(epoch_now());
        }
    }
}

#[async_trait]
impl QueueStore for DemoStore {
    async fn fetch_snapshot(&self) -> Result<Vec<QueueItem>, StoreError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn persist_reorder(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap();
        let mut queued: Vec<QueueItem> = Vec::new();
        items.retain(|i| {
            if i.status == JobStatus::Queued {
                queued.push(i.clone());
                false
            } else {
                true
            }
        });
        for id in ids {
            if let Some(pos) = queued.iter().position(|i| &i.id == id) {
                items.push(queued.remove(pos));
            }
        }
        Ok(())
    }

    async fn persist_remove(&self, id: &str) -> Result<(), StoreError> {
        self.items.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }

    async fn persist_clear_all(&self) -> Result<(), StoreError> {
        self.items.lock().unwrap().clear();
        Ok(())
    }

    async fn persist_clear_completed(&self) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap()
            .retain(|i| !i.status.is_terminal());
        Ok(())
    }

    async fn persist_pause(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn persist_resume(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Synthetic worker
// ---------------------------------------------------------------------------

/// Process queued items one at a time, publishing live records the way a
/// real synthesis worker would push them.
async fn run_worker(store: Arc<DemoStore>, feed: Arc<LiveFeed>) {
    while let Some(item) = store.claim_next() {
        tracing::info!(job_id = %item.id, title = item.title.as_deref(), "Worker picked up job");

        let steps = 20u32;
        for step in 1..=steps {
            let mut map = HashMap::new();
            map.insert(
                item.id.clone(),
                LiveJobRecord {
                    status: JobStatus::Running,
                    progress: f64::from(step) / f64::from(steps),
                    started_at: item.started_at,
                    eta_seconds: item.eta_seconds,
                    current_step: Some(format!("segment {step}/{steps}")),
                },
            );
            feed.publish(map);
            tokio::time::sleep(WORKER_STEP).await;
        }

        store.finish(&item.id);
        feed.publish(HashMap::new());
        tracing::info!(job_id = %item.id, "Worker finished job");
    }
    tracing::info!("Worker drained the queue");
}

// ---------------------------------------------------------------------------
// Scripted operator
// ---------------------------------------------------------------------------

/// Exercise the mutation surface on a fixed timeline.
async fn run_operator(engine: Arc<QueueEngine<DemoStore>>) {
    tokio::time::sleep(Duration::from_secs(3)).await;
    let pending = engine.view().current().partitions.pending_ids();
    if pending.len() >= 2 {
        let mut reversed = pending.clone();
        reversed.reverse();
        tracing::info!("Operator reorders the pending queue");
        if let Err(e) = engine.coordinator().reorder(reversed) {
            tracing::warn!(error = %e, "Reorder rejected");
        }
    }

    tokio::time::sleep(Duration::from_secs(4)).await;
    tracing::info!("Operator pauses, then immediately resumes");
    engine.coordinator().toggle_pause();
    engine.coordinator().toggle_pause();

    tokio::time::sleep(Duration::from_secs(15)).await;
    tracing::info!("Operator clears completed items");
    if let Err(e) = engine.coordinator().clear_completed().await {
        tracing::warn!(error = %e, "Clear-completed failed");
    }
}

// ---------------------------------------------------------------------------
// Render loop
// ---------------------------------------------------------------------------

/// Sample the shared clock and log what the dashboard would paint.
async fn render_loop(engine: &QueueEngine<DemoStore>, duration: Duration) {
    let mut ticks = engine.clock().subscribe();
    let mut cards: HashMap<String, JobCard> = HashMap::new();
    let deadline = tokio::time::Instant::now() + duration;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            tick = ticks.recv() => {
                let now = match tick {
                    Ok(now) => now,
                    // A lagged subscriber just skips the missed ticks.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let view = engine.view().current();

                // cards live exactly as long as their item is active
                cards.retain(|id, _| view.partitions.active.iter().any(|i| &i.id == id));

                for item in &view.partitions.active {
                    let card = cards
                        .entry(item.id.clone())
                        .or_insert_with(|| JobCard::new(item.id.clone()));
                    let live = engine.view().live_record(&item.id);
                    let card_display = card.tick(item, live.as_ref(), now);
                    let percent = format!("{:.0}%", card_display.display_progress * 100.0);

                    tracing::info!(
                        job_id = %item.id,
                        title = item.title.as_deref(),
                        status = card_display.status.label(),
                        progress = %percent,
                        remaining = card_display.remaining_label.as_deref().unwrap_or("--"),
                        step = card_display.current_step.as_deref(),
                        "Active",
                    );
                }

                tracing::info!(
                    pending = view.partitions.pending.len(),
                    history = view.partitions.history.len(),
                    paused = view.paused,
                    "Queue",
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fablecast_simulator=info,fablecast_queue=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(DemoStore::seeded(4));
    let feed = Arc::new(LiveFeed::new());
    let engine = Arc::new(QueueEngine::start(
        store.clone(),
        feed.subscribe(),
        EngineConfig::from_env(),
    ));

    tokio::spawn(run_worker(store, feed));
    tokio::spawn(run_operator(engine.clone()));

    render_loop(&engine, DEMO_DURATION).await;

    engine.shutdown();
    tracing::info!("Demo complete");
    Ok(())
}
