//! Shared display tick.
//!
//! One clock drives every visible card instead of a timer per card. Ticks
//! fan out over a broadcast channel; a card subscribes while visible and
//! simply drops its receiver when it leaves the screen, so there is nothing
//! to leak across navigation.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Fan-out buffer. Ticks are only a second apart; a subscriber that lags
/// this far behind can safely skip ahead.
const TICK_CHANNEL_CAPACITY: usize = 16;

/// Current time as fractional epoch seconds.
pub fn epoch_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Shared once-per-second tick source for estimator/ratchet sampling.
pub struct TickClock {
    sender: broadcast::Sender<f64>,
    interval: Duration,
}

impl TickClock {
    pub fn new(interval: Duration) -> Self {
        let (sender, _rx) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self { sender, interval }
    }

    /// Subscribe to ticks. Each tick carries the epoch time it fired at.
    /// Dropping the receiver deregisters the subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<f64> {
        self.sender.subscribe()
    }

    /// Run the tick loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Tick clock stopped");
                    break;
                }
                _ = ticker.tick() => {
                    // No receivers is fine; nothing is on screen right now.
                    let _ = self.sender.send(epoch_now());
                }
            }
        }
    }
}
