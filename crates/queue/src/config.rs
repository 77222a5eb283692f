//! Engine configuration.

use std::time::Duration;

/// Timing knobs for the view engine.
///
/// All fields have defaults suitable for an interactive dashboard; override
/// via environment variables where the embedding application wants to.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Safety-net snapshot poll interval (default: 30s).
    pub snapshot_poll_interval: Duration,
    /// Quiet period collapsing rapid reorder gestures (default: 500ms).
    pub reorder_debounce: Duration,
    /// Display tick driving estimator/ratchet sampling (default: 1s).
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_poll_interval: Duration::from_secs(30),
            reorder_debounce: Duration::from_millis(500),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `QUEUE_POLL_INTERVAL_SECS` | `30`  |
    /// | `REORDER_DEBOUNCE_MS`      | `500` |
    /// | `DISPLAY_TICK_MS`          | `1000`|
    pub fn from_env() -> Self {
        let poll_secs: u64 = std::env::var("QUEUE_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("QUEUE_POLL_INTERVAL_SECS must be a valid u64");

        let debounce_ms: u64 = std::env::var("REORDER_DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("REORDER_DEBOUNCE_MS must be a valid u64");

        let tick_ms: u64 = std::env::var("DISPLAY_TICK_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("DISPLAY_TICK_MS must be a valid u64");

        Self {
            snapshot_poll_interval: Duration::from_secs(poll_secs),
            reorder_debounce: Duration::from_millis(debounce_ms),
            tick_interval: Duration::from_millis(tick_ms),
        }
    }
}
