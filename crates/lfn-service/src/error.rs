//! Service-layer error type.

use thiserror::Error;

use lfn_dispute::DisputeError;

/// Errors surfaced by the dispute service API.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No dispute with the given identifier.
    #[error("dispute {dispute_id} not found")]
    NotFound {
        /// The unrecognized dispute identifier.
        dispute_id: String,
    },

    /// Optimistic concurrency check failed: the aggregate moved since the
    /// caller last read it. Re-read and retry; the write is never merged.
    #[error(
        "version conflict on dispute {dispute_id}: expected {expected}, actual {actual} ({status})"
    )]
    VersionConflict {
        /// The dispute identifier.
        dispute_id: String,
        /// Version the caller expected.
        expected: u64,
        /// Version actually stored.
        actual: u64,
        /// Current dispute status, so the caller can decide to abandon.
        status: String,
    },

    /// The engine rejected the mutation.
    #[error(transparent)]
    Dispute(#[from] DisputeError),
}
