//! Per-item display driver.
//!
//! A card samples the shared clock while visible: each tick it merges the
//! freshest live record over its snapshot item, runs the estimator, feeds
//! the ratchet, and hands the renderer a ready-to-paint state.

use fablecast_core::display::DisplayState;
use fablecast_core::estimate::estimate_remaining;
use fablecast_core::job::{JobStatus, LiveJobRecord, QueueItem};
use fablecast_core::reconcile::merge_item;
use fablecast_core::timefmt::format_clock;
use serde::Serialize;

/// One rendered card state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDisplay {
    pub status: JobStatus,
    /// Fraction for the progress bar.
    pub display_progress: f64,
    /// Ratcheted countdown value.
    pub remaining_seconds: Option<u64>,
    /// Countdown label, e.g. `"1:30"`.
    pub remaining_label: Option<String>,
    /// Stage text from the live record, if any.
    pub current_step: Option<String>,
}

/// Countdown state for one visible item. Create it when the card appears,
/// drop it when the card leaves the screen.
#[derive(Debug)]
pub struct JobCard {
    id: String,
    state: DisplayState,
}

impl JobCard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DisplayState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Advance one display tick at time `now` (fractional epoch seconds).
    pub fn tick(
        &mut self,
        item: &QueueItem,
        live: Option<&LiveJobRecord>,
        now: f64,
    ) -> CardDisplay {
        let merged = merge_item(item, live);
        let estimate = estimate_remaining(
            merged.progress,
            merged.started_at,
            merged.eta_seconds,
            now,
        );
        let displayed = self.state.observe(estimate.remaining_seconds);

        CardDisplay {
            status: merged.status,
            display_progress: estimate.display_progress,
            remaining_seconds: displayed,
            remaining_label: displayed.map(format_clock),
            current_step: live.and_then(|l| l.current_step.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_item() -> QueueItem {
        let mut item = QueueItem::new("j1", JobStatus::Running, 900.0);
        item.started_at = Some(990.0);
        item.eta_seconds = Some(100.0);
        item.progress = 0.10;
        item
    }

    #[test]
    fn tick_produces_a_countdown_label() {
        let mut card = JobCard::new("j1");
        let display = card.tick(&running_item(), None, 1000.0);

        assert_eq!(display.remaining_seconds, Some(90));
        assert_eq!(display.remaining_label.as_deref(), Some("1:30"));
        assert!((display.display_progress - 0.10).abs() < 1e-9);
    }

    #[test]
    fn repeated_ticks_count_down_smoothly() {
        let mut card = JobCard::new("j1");
        let item = running_item();

        let first = card.tick(&item, None, 1000.0);
        assert_eq!(first.remaining_seconds, Some(90));

        // next tick one second later: the raw estimate moves to 89, within
        // the jitter threshold, so the display decrements by one
        let second = card.tick(&item, None, 1001.0);
        assert_eq!(second.remaining_seconds, Some(89));
        assert_eq!(second.remaining_label.as_deref(), Some("1:29"));
    }

    #[test]
    fn live_record_overrides_snapshot_progress() {
        let mut card = JobCard::new("j1");
        let live = LiveJobRecord {
            status: JobStatus::Running,
            progress: 0.5,
            started_at: Some(990.0),
            eta_seconds: Some(100.0),
            current_step: Some("chapter 3/12".to_string()),
        };

        let display = card.tick(&running_item(), Some(&live), 1000.0);
        assert!((display.display_progress - 0.5).abs() < 1e-9);
        assert_eq!(display.current_step.as_deref(), Some("chapter 3/12"));
    }

    #[test]
    fn queued_item_has_no_countdown() {
        let mut card = JobCard::new("j1");
        let item = QueueItem::new("j1", JobStatus::Queued, 900.0);

        let display = card.tick(&item, None, 1000.0);
        assert_eq!(display.remaining_seconds, None);
        assert_eq!(display.remaining_label, None);
    }
}
