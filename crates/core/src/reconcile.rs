//! Merge of the authoritative snapshot with the live job map.
//!
//! The snapshot is slow truth, the live map is fast but ephemeral. The merge
//! lets live fields win only where that keeps the status lifecycle moving
//! forward; a stale live record lagging behind a snapshot that has already
//! observed completion is ignored wholesale. Pure data in, pure data out;
//! no side effects, so the merge can be recomputed on every live tick.

use std::collections::{HashMap, HashSet};

use crate::job::{JobStatus, LiveJobRecord, QueueItem};

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

/// The merged queue view, split the way the dashboard renders it.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct QueuePartitions {
    /// Running items, snapshot order.
    pub active: Vec<QueueItem>,
    /// Queued items, snapshot order. The only reorderable partition.
    pub pending: Vec<QueueItem>,
    /// Terminal items, newest first by completion time.
    pub history: Vec<QueueItem>,
}

impl QueuePartitions {
    /// Ids of the pending partition in display order.
    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.iter().map(|i| i.id.clone()).collect()
    }

    /// Whether another merge result has the same effective shape: the same
    /// ids with the same statuses in the same order, per partition.
    ///
    /// Progress wobble alone does not change the shape; callers use this to
    /// skip republishing a view nothing downstream would re-render for.
    pub fn same_shape(&self, other: &QueuePartitions) -> bool {
        fn shape_eq(a: &[QueueItem], b: &[QueueItem]) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| x.id == y.id && x.status == y.status)
        }

        shape_eq(&self.active, &other.active)
            && shape_eq(&self.pending, &other.pending)
            && shape_eq(&self.history, &other.history)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge one snapshot item with its live record, if any.
///
/// Live fields take precedence only when the live status does not move the
/// lifecycle backward; otherwise the record is older truth and the snapshot
/// stands untouched.
pub fn merge_item(item: &QueueItem, live: Option<&LiveJobRecord>) -> QueueItem {
    let Some(live) = live else {
        return item.clone();
    };

    if !live.status.advances_from(item.status) {
        return item.clone();
    }

    let mut merged = item.clone();
    merged.status = live.status;
    merged.progress = live.progress;
    if live.started_at.is_some() {
        merged.started_at = live.started_at;
    }
    if live.eta_seconds.is_some() {
        merged.eta_seconds = live.eta_seconds;
    }
    merged
}

/// Merge a snapshot with the live map into Active / Pending / History.
///
/// Duplicate ids in the snapshot are dropped after their first occurrence so
/// the merged view never shows the same item twice.
pub fn reconcile(
    snapshot: &[QueueItem],
    live: &HashMap<String, LiveJobRecord>,
) -> QueuePartitions {
    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());
    let mut partitions = QueuePartitions::default();

    for item in snapshot {
        if !seen.insert(item.id.as_str()) {
            continue;
        }

        let merged = merge_item(item, live.get(&item.id));
        match merged.status {
            JobStatus::Running => partitions.active.push(merged),
            JobStatus::Queued => partitions.pending.push(merged),
            _ => partitions.history.push(merged),
        }
    }

    // Newest completion first; ties and missing timestamps keep snapshot
    // order because the sort is stable.
    partitions.history.sort_by(|a, b| {
        b.completed_at
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.completed_at.unwrap_or(f64::NEG_INFINITY))
    });

    partitions
}
