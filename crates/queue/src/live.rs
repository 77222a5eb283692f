//! Push-delivered live job map.
//!
//! [`LiveFeed`] is the hand-off point between whatever push transport the
//! application uses (WebSocket, SSE, in-process callback) and the engine.
//! The producer publishes whole maps; the engine holds a receiver and only
//! ever reads. Sharing via `Arc` keeps a publish cheap no matter how many
//! subscribers are watching.

use std::collections::HashMap;
use std::sync::Arc;

use fablecast_core::job::LiveJobRecord;
use tokio::sync::watch;

/// The current set of executing jobs, keyed by the snapshot `id`.
pub type LiveJobMap = Arc<HashMap<String, LiveJobRecord>>;

/// Watch-channel hub for the live job map.
pub struct LiveFeed {
    tx: watch::Sender<LiveJobMap>,
}

impl LiveFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LiveJobMap::default());
        Self { tx }
    }

    /// Replace the current map. Every subscriber observes the new reference.
    pub fn publish(&self, map: HashMap<String, LiveJobRecord>) {
        self.tx.send_replace(Arc::new(map));
    }

    /// Subscribe to map replacements. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<LiveJobMap> {
        self.tx.subscribe()
    }

    /// The most recently published map.
    pub fn current(&self) -> LiveJobMap {
        self.tx.borrow().clone()
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fablecast_core::job::JobStatus;

    #[test]
    fn publish_replaces_the_map_reference() {
        let feed = LiveFeed::new();
        let before = feed.current();

        let mut map = HashMap::new();
        map.insert(
            "j1".to_string(),
            LiveJobRecord {
                status: JobStatus::Running,
                progress: 0.5,
                started_at: Some(100.0),
                eta_seconds: Some(60.0),
                current_step: None,
            },
        );
        feed.publish(map);

        let after = feed.current();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.contains_key("j1"));
    }

    #[tokio::test]
    async fn subscribers_observe_replacements() {
        let feed = LiveFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(HashMap::new());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }
}
