//! Async view engine for the fablecast queue dashboard.
//!
//! Two independently-timed inputs (the slow authoritative snapshot pulled
//! from the persistence store and the fast, push-delivered live job map)
//! are merged through the pure logic in `fablecast-core` into one shared
//! queue view. Operator mutations apply optimistically against that view,
//! confirm against the store, and fall back to a fresh snapshot pull when a
//! call fails.

pub mod card;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod live;
pub mod scheduler;
pub mod store;
pub mod view;

pub use card::{CardDisplay, JobCard};
pub use clock::{epoch_now, TickClock};
pub use config::EngineConfig;
pub use coordinator::MutationCoordinator;
pub use engine::QueueEngine;
pub use live::{LiveFeed, LiveJobMap};
pub use scheduler::{RefreshHandle, RefreshScheduler};
pub use store::{QueueStore, StoreError};
pub use view::{QueueView, ViewSnapshot};
