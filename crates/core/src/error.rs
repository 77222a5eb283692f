/// Errors produced by the pure queue logic.
///
/// Precondition failures are surfaced before any local mutation or network
/// call, so a rejected operation never leaves a partial delta behind.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
