//! Pure queue/progress logic for the fablecast dashboard.
//!
//! This crate has zero internal deps and no async so it can be used by the
//! view engine, any future CLI tooling, and plain unit tests alike. It owns
//! the job data model, the snapshot/live-map reconciler, the remaining-time
//! estimator, and the display ratchet.

pub mod display;
pub mod error;
pub mod estimate;
pub mod job;
pub mod reconcile;
pub mod timefmt;

pub use error::CoreError;
