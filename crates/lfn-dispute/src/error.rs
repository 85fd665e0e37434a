//! # Dispute Engine Errors
//!
//! Structured error type for every rejectable operation on a dispute case.
//! Variants carry enough context (dispute id, current state, version) for a
//! caller to log the rejection or surface a meaningful conflict response
//! without re-reading the aggregate.

use thiserror::Error;

/// Errors produced by dispute-case operations.
#[derive(Debug, Error)]
pub enum DisputeError {
    /// The dispute cannot be opened as specified (e.g., fewer than two
    /// distinct claimants).
    #[error("invalid dispute: {reason}")]
    InvalidDispute {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// A claimant with the same identity (or contact email) is already
    /// registered on this dispute.
    #[error("claimant {claimant_id} is already registered on this dispute")]
    DuplicateClaimant {
        /// The conflicting claimant identity.
        claimant_id: String,
    },

    /// The referenced claimant is not registered on this dispute.
    #[error("claimant {claimant_id} is not registered on this dispute")]
    UnknownClaimant {
        /// The unrecognized claimant identity.
        claimant_id: String,
    },

    /// Evidence submission failed structural validation.
    #[error("malformed evidence: {reason}")]
    MalformedEvidence {
        /// What the validation rejected.
        reason: String,
    },

    /// The referenced evidence item does not exist in this dispute's ledger.
    #[error("evidence {evidence_id} not found in this dispute")]
    UnknownEvidence {
        /// The unrecognized evidence identifier.
        evidence_id: String,
    },

    /// The evidence item was already verified with a different result.
    /// Verification outcomes are write-once; re-verification with the same
    /// result is an accepted no-op and does not reach this error.
    #[error("evidence {evidence_id} already verified as {result}")]
    AlreadyVerified {
        /// The already-verified evidence identifier.
        evidence_id: String,
        /// The recorded verification result.
        result: String,
    },

    /// Panel assignment rejected: below the minimum of three members.
    #[error("verification panel requires at least 3 members, got {size}")]
    PanelTooSmall {
        /// Number of members in the rejected assignment.
        size: usize,
    },

    /// A panel member id appears more than once in the assignment.
    #[error("panel member {member_id} appears more than once in the assignment")]
    DuplicatePanelMember {
        /// The duplicated member identifier.
        member_id: String,
    },

    /// A panel is already assigned to this dispute. Panel composition is
    /// immutable after assignment.
    #[error("dispute {dispute_id} already has a verification panel assigned")]
    PanelAlreadyAssigned {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// The operation requires an assigned panel and none exists.
    #[error("dispute {dispute_id} has no verification panel assigned")]
    PanelNotAssigned {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// The referenced panel member is not on this dispute's panel.
    #[error("panel member {member_id} is not on this dispute's panel")]
    UnknownPanelMember {
        /// The unrecognized panel member identifier.
        member_id: String,
    },

    /// The dispute is in a terminal state and rejects all further mutation.
    #[error("dispute {dispute_id} is {status} (version {version}) and accepts no further mutation")]
    StaleState {
        /// The dispute identifier.
        dispute_id: String,
        /// Current (terminal) status.
        status: String,
        /// Current aggregate version.
        version: u64,
    },

    /// Internal invariants of the aggregate are violated; the dispute is
    /// frozen until an operator intervenes.
    #[error("dispute {dispute_id} failed integrity check: {reason}")]
    CorruptedState {
        /// The dispute identifier.
        dispute_id: String,
        /// Which invariant is violated.
        reason: String,
    },
}
