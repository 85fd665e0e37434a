//! # lfn-dispute — Multi-Enterprise Dispute Adjudication
//!
//! The decision engine for ownership disputes over recovered items in the
//! lost-and-found network. When two or more parties, possibly from different
//! member enterprises, claim the same item, this crate registers the
//! competing claims, collects supporting evidence, records panel votes under
//! a quorum rule, and either declares a winner or escalates to a human.
//!
//! ## Components
//!
//! - [`claimant`] — registry of competing claims with uniqueness enforcement.
//! - [`evidence`] — append-only evidence ledger with exactly-once verification.
//! - [`panel`] — adjudicator panel assignment and vote recording.
//! - [`resolution`] — quorum tally, tie-break ladder, deadlock detection.
//! - [`escalation`] — cross-cutting escalation triggers and the SLA policy.
//! - [`case`] — the [`DisputeCase`] aggregate root and state machine.
//!
//! ## Crate Policy
//!
//! This crate is synchronous and self-contained: collaborator calls (trust
//! scores, stolen-property checks, staffing) happen in `lfn-service`, which
//! feeds their results into the aggregate as plain values. Every mutator
//! returns the new aggregate `version`; the service layer uses it as the
//! optimistic concurrency token.

pub mod case;
pub mod claimant;
pub mod error;
pub mod escalation;
pub mod evidence;
pub mod panel;
pub mod resolution;

pub use case::{
    DisputeCase, DisputeStatus, DisputeType, ItemSnapshot, StolenMatch, TransitionRecord,
    VoteOutcome,
};
pub use claimant::{ClaimStatus, Claimant, ClaimantRegistry};
pub use error::DisputeError;
pub use escalation::{EscalationPolicy, EscalationTrigger};
pub use evidence::{
    EvidenceItem, EvidenceLedger, EvidenceSubmission, EvidenceType, VerificationResult,
    VerifyAction,
};
pub use panel::{PanelMember, PanelNominee, VerificationPanel, Vote, VoteAction};
pub use resolution::{DeadlockReason, Resolution, TallyOutcome, TieBreakRule};
