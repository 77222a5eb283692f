//! Job data model: lifecycle status, snapshot items, and live records.
//!
//! Timestamps are fractional epoch seconds, matching what the persistence
//! layer reports. Display metadata is carried opaquely and never mutated
//! here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of a queued job.
///
/// The lifecycle only ever moves forward:
/// `queued -> running -> {done | failed | cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Position in the lifecycle: queued (0) -> running (1) -> terminal (2).
    fn phase(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Done | Self::Failed | Self::Cancelled => 2,
        }
    }

    /// Whether adopting `self` in place of `from` keeps the lifecycle moving
    /// forward. A terminal status is never replaced by `queued` or `running`,
    /// no matter how fresh the replacement claims to be.
    pub fn advances_from(self, from: JobStatus) -> bool {
        self.phase() >= from.phase()
    }

    /// Human-readable label for card badges.
    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Running => "Running",
            Self::Done => "Done",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot item
// ---------------------------------------------------------------------------

/// A unit of queued work as known to the persistence layer.
///
/// `id` is opaque and stable for the item's lifetime; it is the join key
/// between snapshot items and live records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub status: JobStatus,

    /// Fractional progress in `0.0..=1.0`, meaningful only while running.
    #[serde(default)]
    pub progress: f64,

    /// Epoch seconds; present only once the job has started running.
    #[serde(default)]
    pub started_at: Option<f64>,

    /// A-priori predicted total duration in seconds. Coarse.
    #[serde(default)]
    pub eta_seconds: Option<f64>,

    /// Epoch seconds at enqueue time.
    pub created_at: f64,

    /// Epoch seconds at terminal transition, used for history ordering.
    #[serde(default)]
    pub completed_at: Option<f64>,

    /// Display title, passed through untouched.
    #[serde(default)]
    pub title: Option<String>,

    /// Parent grouping (project/book), passed through untouched.
    #[serde(default)]
    pub group: Option<String>,

    /// Everything else the store sends along for display. Opaque.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl QueueItem {
    /// Minimal constructor for a freshly enqueued item.
    pub fn new(id: impl Into<String>, status: JobStatus, created_at: f64) -> Self {
        Self {
            id: id.into(),
            status,
            progress: 0.0,
            started_at: None,
            eta_seconds: None,
            created_at,
            completed_at: None,
            title: None,
            group: None,
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Live record
// ---------------------------------------------------------------------------

/// Ephemeral, higher-frequency view of a currently-executing job.
///
/// Delivered by the push transport outside the polling cycle and keyed by
/// the same `id` as the snapshot. Fields here may be fresher than the last
/// snapshot, but a stale record must never move a job's status backward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveJobRecord {
    pub status: JobStatus,

    #[serde(default)]
    pub progress: f64,

    #[serde(default)]
    pub started_at: Option<f64>,

    #[serde(default)]
    pub eta_seconds: Option<f64>,

    /// Free-text stage label ("chapter 3/12"), display passthrough.
    #[serde(default)]
    pub current_step: Option<String>,
}
