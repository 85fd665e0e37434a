//! # lfn-service — Dispute Service Layer
//!
//! Wraps the `lfn-dispute` engine in its operational shell: a thread-safe
//! versioned aggregate store, async adapters for the external collaborators
//! (trust scores, stolen-property registry) with retry/timeout/degrade, and
//! the function-level API callers use.
//!
//! ## Concurrency Contract
//!
//! - All mutations to one dispute run inside a single write-locked
//!   read-validate-update closure (single-writer-per-aggregate).
//! - Every mutating call carries the caller's expected `version`; a
//!   mismatch fails with [`ServiceError::VersionConflict`] and is never
//!   silently merged.
//! - Reads clone a snapshot; a reader never observes a half-applied
//!   mutation.
//! - Collaborator calls complete before the lock is taken, so a pending
//!   stolen-property check never blocks vote processing.

pub mod collaborators;
pub mod error;
pub mod service;
pub mod store;
pub mod view;

mod retry;

pub use collaborators::{
    CollaboratorError, MockStolenPropertyRegistry, MockTrustScoreService, SerialCheck,
    StolenPropertyRegistry, TrustScoreService,
};
pub use error::ServiceError;
pub use service::{DisputeService, NewClaimant, ServiceConfig, VerifyOutcome};
pub use store::DisputeStore;
pub use view::{DisputeFilter, DisputeView};
