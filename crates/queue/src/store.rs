//! Persistence collaborator contract.
//!
//! The engine never talks to a transport directly; it consumes this trait.
//! The surrounding system implements it over JSON-over-HTTP, tests
//! implement it in memory. Snapshots carry full-replace semantics: no
//! pagination, no deltas.

use async_trait::async_trait;
use fablecast_core::job::QueueItem;

/// Failure of a store call. Never fatal to the engine; every path recovers
/// by re-deriving from a fresh snapshot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The call could not reach the store or timed out.
    #[error("Store request failed: {0}")]
    Transport(String),

    /// The store understood and refused the request.
    #[error("Store rejected request: {0}")]
    Rejected(String),
}

/// Operations the engine needs from the persistence layer.
#[async_trait]
pub trait QueueStore: Send + Sync + 'static {
    /// Fetch the full, authoritative queue listing.
    async fn fetch_snapshot(&self) -> Result<Vec<QueueItem>, StoreError>;

    /// Persist a new order for the pending partition.
    async fn persist_reorder(&self, ids: &[String]) -> Result<(), StoreError>;

    /// Delete a single item.
    async fn persist_remove(&self, id: &str) -> Result<(), StoreError>;

    /// Delete every item.
    async fn persist_clear_all(&self) -> Result<(), StoreError>;

    /// Delete every item in a terminal status.
    async fn persist_clear_completed(&self) -> Result<(), StoreError>;

    /// Pause queue processing.
    async fn persist_pause(&self) -> Result<(), StoreError>;

    /// Resume queue processing.
    async fn persist_resume(&self) -> Result<(), StoreError>;
}
