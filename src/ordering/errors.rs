use uuid::Uuid;

use crate::domain::order::OrderError;

// ============================================================================
// Ordering Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    #[error("order not found: {0}")]
    NotFound(Uuid),

    /// Command input failed value-object validation; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] OrderError),

    /// An inbound integration event carried undecodable payload blobs.
    #[error("malformed checkout event payload: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("order storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}
