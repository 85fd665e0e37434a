//! # lfn-core — Foundational Types for the LFN Dispute Engine
//!
//! Leaf crate of the workspace: defines the domain primitives shared by the
//! adjudication engine and the service layer. It depends on no other
//! internal crate.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `DisputeId`,
//!    `EvidenceId`, `ClaimantId`, `PanelMemberId` — no bare strings or
//!    UUIDs cross a module boundary. A claimant id cannot be passed where a
//!    panel member id is expected.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision so that audit trails serialize
//!    deterministically.
//!
//! 3. **Validated value types.** `TrustScore` rejects anything outside
//!    0–100 at construction; `Money` stores decimal strings and rejects
//!    floats, so an estimated item value never loses precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lfn-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;
pub mod trust;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{ClaimantId, DisputeId, EvidenceId, PanelMemberId};
pub use money::Money;
pub use temporal::Timestamp;
pub use trust::TrustScore;
