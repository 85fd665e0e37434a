//! # Dispute Case Lifecycle
//!
//! The aggregate root and state machine for a multi-enterprise ownership
//! dispute: `Pending → UnderReview → Resolved | Escalated`. The aggregate
//! owns its claimant registry, evidence ledger, and verification panel, and
//! drives the resolution tally after every accepted vote.
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! Status is a runtime-validated enum rather than a typestate. Escalation is
//! reachable from every non-terminal state through four independent triggers,
//! so typestate would duplicate the escalation path across impl blocks; and
//! the aggregate is persisted and shipped across the store boundary, where
//! the state is not known at compile time and must serialize directly.
//!
//! ## Concurrency Contract
//!
//! The aggregate itself is single-threaded. `version` is a monotonic counter
//! incremented exactly once per accepted mutation; the service layer
//! serializes writers per aggregate and uses `version` as the optimistic
//! concurrency token. Every mutator returns the new version so callers can
//! detect races.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use lfn_core::{ClaimantId, DisputeId, EvidenceId, Money, PanelMemberId, Timestamp};

use crate::claimant::{Claimant, ClaimantRegistry};
use crate::error::DisputeError;
use crate::escalation::{EscalationPolicy, EscalationTrigger};
use crate::evidence::{EvidenceLedger, EvidenceSubmission, VerificationResult, VerifyAction};
use crate::panel::{PanelNominee, VerificationPanel, Vote, VoteAction};
use crate::resolution::{self, Resolution, TallyOutcome};

// ── Status & classification ────────────────────────────────────────────

/// Lifecycle state of a dispute case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Opened; claimants may register, no evidence or votes yet.
    Pending,
    /// First evidence or first vote recorded; adjudication in progress.
    UnderReview,
    /// Quorum reached and a decisive winner computed. Terminal.
    Resolved,
    /// Handed to a human or to law enforcement. Terminal.
    Escalated,
}

impl DisputeStatus {
    /// String form used in views, logs, and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Pending => "PENDING",
            DisputeStatus::UnderReview => "UNDER_REVIEW",
            DisputeStatus::Resolved => "RESOLVED",
            DisputeStatus::Escalated => "ESCALATED",
        }
    }

    /// Whether the state accepts no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisputeStatus::Resolved | DisputeStatus::Escalated)
    }

    /// States reachable from this one.
    pub fn valid_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            DisputeStatus::Pending => {
                &[DisputeStatus::UnderReview, DisputeStatus::Escalated]
            }
            DisputeStatus::UnderReview => {
                &[DisputeStatus::Resolved, DisputeStatus::Escalated]
            }
            DisputeStatus::Resolved | DisputeStatus::Escalated => &[],
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of the dispute, set at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeType {
    /// Two or more good-faith ownership claims on the same item.
    OwnershipConflict,
    /// Indications the item may be stolen property.
    SuspectedTheft,
    /// Claim documentation contradicts the item record.
    DocumentMismatch,
    /// Claimants span multiple member enterprises.
    CrossEnterprise,
    /// Anything else.
    Other,
}

impl DisputeType {
    /// String form used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeType::OwnershipConflict => "OWNERSHIP_CONFLICT",
            DisputeType::SuspectedTheft => "SUSPECTED_THEFT",
            DisputeType::DocumentMismatch => "DOCUMENT_MISMATCH",
            DisputeType::CrossEnterprise => "CROSS_ENTERPRISE",
            DisputeType::Other => "OTHER",
        }
    }

    /// All dispute types, for enumeration in views.
    pub fn all() -> &'static [DisputeType] {
        &[
            DisputeType::OwnershipConflict,
            DisputeType::SuspectedTheft,
            DisputeType::DocumentMismatch,
            DisputeType::CrossEnterprise,
            DisputeType::Other,
        ]
    }
}

impl std::fmt::Display for DisputeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Supporting records ─────────────────────────────────────────────────

/// Snapshot of the disputed item, captured at dispute creation and never
/// mutated afterwards so a decision mid-flight cannot be contaminated by
/// item-record edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Item identifier in the holding enterprise's inventory.
    pub item_id: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Item category (e.g., "electronics").
    pub category: String,
    /// Estimated value, when appraised.
    pub estimated_value: Option<Money>,
    /// Current physical location.
    pub location: String,
    /// Identifier of the enterprise holding the item.
    pub holding_enterprise_id: String,
    /// Display name of the holding enterprise.
    pub holding_enterprise_name: String,
}

/// One entry in the append-only transition audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_status: DisputeStatus,
    /// State after the transition.
    pub to_status: DisputeStatus,
    /// When the transition was recorded.
    pub timestamp: Timestamp,
    /// Why the transition happened.
    pub reason: String,
}

/// Positive stolen-property registry result attached to a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StolenMatch {
    /// Registry reference for the match, when supplied.
    pub reference_id: Option<String>,
}

/// Result of a vote mutation, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Whether the vote changed panel state.
    pub action: VoteAction,
    /// Dispute status after policy and quorum evaluation.
    pub status: DisputeStatus,
    /// Aggregate version after the mutation.
    pub version: u64,
}

// ── Aggregate ──────────────────────────────────────────────────────────

/// A multi-enterprise ownership dispute over one recovered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeCase {
    /// Unique identifier, immutable after creation.
    pub id: DisputeId,
    /// Snapshot of the disputed item.
    pub item: ItemSnapshot,
    /// Dispute category.
    pub dispute_type: DisputeType,
    /// Why the dispute was opened.
    pub dispute_reason: String,
    /// Identity of whoever opened the dispute.
    pub initiated_by: String,
    /// Distinct enterprises of all registered claimants. Recomputed on each
    /// claimant addition, never independently settable.
    pub involved_enterprises: BTreeSet<String>,
    /// Competing claims, in submission order.
    pub claimants: ClaimantRegistry,
    /// Append-only evidence ledger.
    pub evidence: EvidenceLedger,
    /// Adjudicator panel, assigned once.
    pub panel: Option<VerificationPanel>,
    /// Lifecycle state.
    pub status: DisputeStatus,
    /// The prevailing claimant. Set only on transition into `Resolved`.
    pub winning_claimant_id: Option<ClaimantId>,
    /// Human-readable decision. Set only on `Resolved`.
    pub resolution_decision: Option<String>,
    /// How the decision was reached (plurality or tie-break rule).
    pub resolution_reason: Option<String>,
    /// Tally notes for the audit trail.
    pub resolution_notes: Option<String>,
    /// Why the dispute escalated. Set only on `Escalated`.
    pub escalation_reason: Option<String>,
    /// Whether law enforcement is involved.
    pub police_involved: bool,
    /// Officer handling the escalation, when known.
    pub police_officer_name: Option<String>,
    /// When the dispute was opened.
    pub opened_at: Timestamp,
    /// When the aggregate last accepted a mutation.
    pub updated_at: Timestamp,
    /// Optimistic concurrency token; incremented once per accepted mutation.
    pub version: u64,
    /// Append-only state transition audit trail.
    pub transition_log: Vec<TransitionRecord>,
}

impl DisputeCase {
    /// Open a dispute for an item with its initial competing claimants.
    ///
    /// # Errors
    ///
    /// - [`DisputeError::InvalidDispute`] for fewer than two distinct
    ///   claimant identities.
    /// - [`DisputeError::DuplicateClaimant`] when the initial set repeats an
    ///   identity or contact email.
    pub fn open(
        item: ItemSnapshot,
        dispute_type: DisputeType,
        dispute_reason: impl Into<String>,
        initiated_by: impl Into<String>,
        initial_claimants: Vec<Claimant>,
    ) -> Result<Self, DisputeError> {
        let distinct: BTreeSet<String> = initial_claimants
            .iter()
            .map(|c| c.id.normalized())
            .collect();
        if distinct.len() < 2 {
            return Err(DisputeError::InvalidDispute {
                reason: format!(
                    "a dispute requires at least 2 distinct claimants, got {}",
                    distinct.len()
                ),
            });
        }

        let opened_at = Timestamp::now();
        let mut case = Self {
            id: DisputeId::new(),
            item,
            dispute_type,
            dispute_reason: dispute_reason.into(),
            initiated_by: initiated_by.into(),
            involved_enterprises: BTreeSet::new(),
            claimants: ClaimantRegistry::new(),
            evidence: EvidenceLedger::new(),
            panel: None,
            status: DisputeStatus::Pending,
            winning_claimant_id: None,
            resolution_decision: None,
            resolution_reason: None,
            resolution_notes: None,
            escalation_reason: None,
            police_involved: false,
            police_officer_name: None,
            opened_at,
            updated_at: opened_at,
            version: 1,
            transition_log: vec![TransitionRecord {
                from_status: DisputeStatus::Pending,
                to_status: DisputeStatus::Pending,
                timestamp: opened_at,
                reason: "dispute opened".to_string(),
            }],
        };
        for claimant in initial_claimants {
            case.claimants.register(claimant)?;
        }
        case.recompute_enterprises();
        Ok(case)
    }

    /// Register a late-joining claimant. The escalation policy is
    /// re-evaluated as part of the mutation: a lapsed SLA window escalates
    /// the dispute after the claimant is recorded.
    ///
    /// # Errors
    ///
    /// [`DisputeError::DuplicateClaimant`], or [`DisputeError::StaleState`]
    /// once terminal.
    pub fn add_claimant(
        &mut self,
        claimant: Claimant,
        policy: &EscalationPolicy,
    ) -> Result<u64, DisputeError> {
        self.require_mutable()?;
        self.claimants.register(claimant)?;
        if self.status == DisputeStatus::UnderReview {
            self.claimants.mark_under_review();
        }
        self.recompute_enterprises();
        let version = self.bump();
        self.apply_sla(policy);
        Ok(version)
    }

    /// Append evidence to the ledger. Transitions `Pending → UnderReview`
    /// on the first item; links the evidence to its submitter when the
    /// submitter is a registered claimant. A lapsed SLA window escalates
    /// the dispute after the evidence is recorded.
    pub fn add_evidence(
        &mut self,
        submission: EvidenceSubmission,
        policy: &EscalationPolicy,
    ) -> Result<(EvidenceId, u64), DisputeError> {
        self.require_mutable()?;
        let (evidence_id, submitted_by) = {
            let item = self.evidence.append(submission)?;
            (item.id.clone(), item.submitted_by.clone())
        };
        self.claimants.link_evidence(&submitted_by, evidence_id.clone());
        if self.status == DisputeStatus::Pending {
            self.record_transition(DisputeStatus::UnderReview, "first evidence recorded");
            self.claimants.mark_under_review();
        }
        let version = self.bump();
        self.apply_sla(policy);
        Ok((evidence_id, version))
    }

    /// Record a verification outcome for an evidence item. A positive
    /// stolen-property match escalates the dispute with police involvement
    /// in the same mutation, regardless of the VALID/INVALID outcome;
    /// otherwise a lapsed SLA window escalates after the outcome is
    /// recorded.
    ///
    /// An identical re-verification with no stolen match is an accepted
    /// no-op: the version does not change and no policy is re-evaluated.
    pub fn verify_evidence(
        &mut self,
        evidence_id: &EvidenceId,
        result: VerificationResult,
        stolen_match: Option<StolenMatch>,
        policy: &EscalationPolicy,
    ) -> Result<(VerifyAction, u64), DisputeError> {
        self.require_mutable()?;
        let action = self.evidence.verify(evidence_id, result)?;
        if let Some(m) = stolen_match {
            self.escalate(
                EscalationTrigger::StolenPropertyMatch {
                    evidence_id: evidence_id.clone(),
                    reference_id: m.reference_id,
                },
                None,
            );
            return Ok((action, self.bump()));
        }
        if action == VerifyAction::Unchanged {
            return Ok((action, self.version));
        }
        let version = self.bump();
        self.apply_sla(policy);
        Ok((action, version))
    }

    /// Seat the verification panel. One-time: composition and the quorum
    /// threshold are fixed for the dispute's lifetime.
    pub fn assign_panel(&mut self, nominees: Vec<PanelNominee>) -> Result<u64, DisputeError> {
        self.require_mutable()?;
        if self.panel.is_some() {
            return Err(DisputeError::PanelAlreadyAssigned {
                dispute_id: self.id.to_string(),
            });
        }
        self.panel = Some(VerificationPanel::assign(nominees)?);
        Ok(self.bump())
    }

    /// Record a panel member's vote, then evaluate escalation policy and
    /// quorum. An identical resubmission leaves tally, status, and version
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`DisputeError::PanelNotAssigned`] before panel assignment.
    /// - [`DisputeError::UnknownPanelMember`] / [`DisputeError::UnknownClaimant`]
    ///   for unrecognized ids.
    /// - [`DisputeError::StaleState`] once terminal.
    pub fn cast_vote(
        &mut self,
        member_id: &PanelMemberId,
        vote: Vote,
        reason: Option<String>,
        policy: &EscalationPolicy,
    ) -> Result<VoteOutcome, DisputeError> {
        self.require_mutable()?;
        if let Some(claimant_id) = vote.claimant() {
            if !self.claimants.contains(claimant_id) {
                return Err(DisputeError::UnknownClaimant {
                    claimant_id: claimant_id.as_str().to_string(),
                });
            }
        }
        let panel = self
            .panel
            .as_mut()
            .ok_or_else(|| DisputeError::PanelNotAssigned {
                dispute_id: self.id.to_string(),
            })?;
        let action = panel.record_vote(member_id, vote, reason)?;
        if action == VoteAction::Unchanged {
            return Ok(VoteOutcome {
                action,
                status: self.status,
                version: self.version,
            });
        }
        if self.status == DisputeStatus::Pending {
            self.record_transition(DisputeStatus::UnderReview, "first vote recorded");
            self.claimants.mark_under_review();
        }
        let version = self.bump();

        // Escalation policy first: it always wins over a resolution
        // evaluated in the same mutation.
        if self.apply_sla(policy) {
            return Ok(VoteOutcome {
                action,
                status: self.status,
                version,
            });
        }
        let outcome = match &self.panel {
            Some(panel) => resolution::evaluate(panel, &self.claimants, &self.evidence),
            // Presence established above; unreachable.
            None => TallyOutcome::NoQuorum,
        };
        match outcome {
            TallyOutcome::NoQuorum => {}
            TallyOutcome::Winner(resolution) => self.apply_resolution(resolution),
            TallyOutcome::Deadlock(deadlock) => {
                self.escalate(EscalationTrigger::Deadlock(deadlock), None);
            }
        }
        Ok(VoteOutcome {
            action,
            status: self.status,
            version,
        })
    }

    /// Investigator override: escalate from any non-terminal state.
    /// `police_involved` is set when an officer is named.
    pub fn force_escalate(
        &mut self,
        reason: impl Into<String>,
        police_officer_name: Option<String>,
    ) -> Result<u64, DisputeError> {
        self.require_mutable()?;
        self.escalate(
            EscalationTrigger::InvestigatorOverride {
                reason: reason.into(),
            },
            police_officer_name,
        );
        Ok(self.bump())
    }

    /// Detect fatally inconsistent aggregate state. A corrupted dispute is
    /// frozen: every mutation surfaces the corruption, nothing is repaired
    /// automatically.
    pub fn check_integrity(&self) -> Result<(), DisputeError> {
        if self.status == DisputeStatus::Resolved && self.winning_claimant_id.is_none() {
            return Err(DisputeError::CorruptedState {
                dispute_id: self.id.to_string(),
                reason: "RESOLVED with no winning claimant".to_string(),
            });
        }
        if self.status == DisputeStatus::Escalated && self.escalation_reason.is_none() {
            return Err(DisputeError::CorruptedState {
                dispute_id: self.id.to_string(),
                reason: "ESCALATED with no escalation reason".to_string(),
            });
        }
        Ok(())
    }

    /// Quorum threshold, once a panel is assigned.
    pub fn votes_required(&self) -> Option<u32> {
        self.panel.as_ref().map(|p| p.votes_required)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn require_mutable(&self) -> Result<(), DisputeError> {
        self.check_integrity()?;
        if self.status.is_terminal() {
            return Err(DisputeError::StaleState {
                dispute_id: self.id.to_string(),
                status: self.status.as_str().to_string(),
                version: self.version,
            });
        }
        Ok(())
    }

    /// Escalate when the SLA window has lapsed since panel assignment.
    /// Returns whether escalation fired. Runs inside an already-accepted
    /// mutation, so the escalation does not bump the version again.
    fn apply_sla(&mut self, policy: &EscalationPolicy) -> bool {
        let lapsed = self
            .panel
            .as_ref()
            .is_some_and(|p| policy.sla_expired(&p.assigned_at, &Timestamp::now()));
        if lapsed {
            self.escalate(EscalationTrigger::SlaTimeout, None);
        }
        lapsed
    }

    fn bump(&mut self) -> u64 {
        self.version += 1;
        self.updated_at = Timestamp::now();
        self.version
    }

    fn record_transition(&mut self, to: DisputeStatus, reason: impl Into<String>) {
        self.transition_log.push(TransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: Timestamp::now(),
            reason: reason.into(),
        });
        self.status = to;
    }

    fn recompute_enterprises(&mut self) {
        self.involved_enterprises = self
            .claimants
            .iter()
            .map(|c| c.enterprise.clone())
            .collect();
    }

    fn apply_resolution(&mut self, resolution: Resolution) {
        let reason = match resolution.tie_break {
            None => format!(
                "strict plurality: {} of {} non-abstaining votes",
                resolution.vote_count, resolution.total_non_abstaining
            ),
            Some(rule) => format!(
                "plurality tie broken by {}: {} of {} non-abstaining votes",
                rule.as_str(),
                resolution.vote_count,
                resolution.total_non_abstaining
            ),
        };
        let notes = resolution
            .tally
            .iter()
            .map(|(id, count)| format!("{}={count}", id.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        self.record_transition(DisputeStatus::Resolved, reason.clone());
        self.claimants.mark_decision(&resolution.winning_claimant_id);
        self.resolution_decision = Some(format!(
            "item awarded to claimant {}",
            resolution.winning_claimant_id.as_str()
        ));
        self.resolution_reason = Some(reason);
        self.resolution_notes = Some(notes);
        self.winning_claimant_id = Some(resolution.winning_claimant_id);
    }

    fn escalate(&mut self, trigger: EscalationTrigger, police_officer_name: Option<String>) {
        let reason = trigger.reason();
        self.record_transition(DisputeStatus::Escalated, reason.clone());
        self.police_involved = trigger.involves_police() || police_officer_name.is_some();
        self.police_officer_name = police_officer_name;
        self.escalation_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfn_core::TrustScore;

    fn item() -> ItemSnapshot {
        ItemSnapshot {
            item_id: "item-314".to_string(),
            title: "Noise-cancelling headphones".to_string(),
            description: "Black over-ear, scratched left cup".to_string(),
            category: "electronics".to_string(),
            estimated_value: Some(Money::new("349.99", "USD").unwrap()),
            location: "Terminal B lost & found".to_string(),
            holding_enterprise_id: "ent-airport".to_string(),
            holding_enterprise_name: "Airport Security Agency".to_string(),
        }
    }

    fn claimant(id: &str, enterprise: &str, trust: u16) -> Claimant {
        Claimant::new(
            ClaimantId::new(id).unwrap(),
            format!("User {id}"),
            enterprise,
            None,
            "these are mine",
            TrustScore::new(trust).unwrap(),
        )
    }

    fn submission(by: &str) -> EvidenceSubmission {
        EvidenceSubmission {
            submitted_by: by.to_string(),
            submitter_name: format!("User {by}"),
            evidence_type: crate::evidence::EvidenceType::Receipt,
            description: "purchase receipt".to_string(),
            document_ref: None,
            serial_number: None,
        }
    }

    fn nominees(n: usize) -> Vec<PanelNominee> {
        (0..n)
            .map(|i| PanelNominee {
                id: PanelMemberId::new(format!("m{i}")).unwrap(),
                name: format!("Member {i}"),
                role: "adjudicator".to_string(),
                enterprise: "Transit Authority".to_string(),
            })
            .collect()
    }

    fn open_case() -> DisputeCase {
        DisputeCase::open(
            item(),
            DisputeType::OwnershipConflict,
            "two passengers claim the same headphones",
            "investigator-7",
            vec![
                claimant("u-alice", "State University", 70),
                claimant("u-bob", "Transit Authority", 70),
            ],
        )
        .unwrap()
    }

    fn member(id: &str) -> PanelMemberId {
        PanelMemberId::new(id).unwrap()
    }

    fn for_claimant(id: &str) -> Vote {
        Vote::ForClaimant(ClaimantId::new(id).unwrap())
    }

    #[test]
    fn open_requires_two_distinct_claimants() {
        let err = DisputeCase::open(
            item(),
            DisputeType::OwnershipConflict,
            "r",
            "i",
            vec![claimant("u-alice", "State University", 70)],
        )
        .unwrap_err();
        assert!(matches!(err, DisputeError::InvalidDispute { .. }));

        // Case variants of the same identity are not distinct.
        let err = DisputeCase::open(
            item(),
            DisputeType::OwnershipConflict,
            "r",
            "i",
            vec![
                claimant("u-alice", "State University", 70),
                claimant("U-ALICE", "Transit Authority", 70),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DisputeError::InvalidDispute { .. }));
    }

    #[test]
    fn open_starts_pending_at_version_one() {
        let case = open_case();
        assert_eq!(case.status, DisputeStatus::Pending);
        assert_eq!(case.version, 1);
        assert_eq!(case.transition_log.len(), 1);
        assert_eq!(
            case.involved_enterprises,
            ["State University", "Transit Authority"]
                .into_iter()
                .map(String::from)
                .collect()
        );
    }

    #[test]
    fn first_evidence_moves_to_under_review() {
        let mut case = open_case();
        let (_, version) = case
            .add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        assert_eq!(case.status, DisputeStatus::UnderReview);
        assert_eq!(version, 2);
        // Evidence linked to the submitting claimant.
        let alice = case
            .claimants
            .get(&ClaimantId::new("u-alice").unwrap())
            .unwrap();
        assert_eq!(alice.evidence_ids.len(), 1);
        // Second evidence does not transition again.
        case.add_evidence(submission("u-bob"), &EscalationPolicy::disabled())
            .unwrap();
        assert_eq!(
            case.transition_log
                .iter()
                .filter(|t| t.to_status == DisputeStatus::UnderReview)
                .count(),
            1
        );
    }

    #[test]
    fn late_claimant_recomputes_enterprises() {
        let mut case = open_case();
        case.add_claimant(claimant("u-carol", "City Airport", 55), &EscalationPolicy::disabled())
            .unwrap();
        assert!(case.involved_enterprises.contains("City Airport"));
        assert_eq!(case.version, 2);
    }

    #[test]
    fn plurality_resolution_marks_claims() {
        let mut case = open_case();
        case.add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        case.assign_panel(nominees(3)).unwrap();
        assert_eq!(case.votes_required(), Some(2));
        let policy = EscalationPolicy::disabled();
        case.cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(case.status, DisputeStatus::UnderReview);
        let outcome = case
            .cast_vote(&member("m1"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(outcome.status, DisputeStatus::Resolved);
        assert_eq!(
            case.winning_claimant_id,
            Some(ClaimantId::new("u-alice").unwrap())
        );
        assert!(case.resolution_reason.as_deref().unwrap().contains("strict plurality"));
        let alice = case
            .claimants
            .get(&ClaimantId::new("u-alice").unwrap())
            .unwrap();
        assert_eq!(alice.claim_status, crate::claimant::ClaimStatus::Approved);
        let bob = case
            .claimants
            .get(&ClaimantId::new("u-bob").unwrap())
            .unwrap();
        assert_eq!(bob.claim_status, crate::claimant::ClaimStatus::Rejected);
    }

    #[test]
    fn terminal_case_rejects_all_mutations() {
        let mut case = open_case();
        case.force_escalate("manual review", None).unwrap();
        assert_eq!(case.status, DisputeStatus::Escalated);
        assert!(matches!(
            case.add_claimant(claimant("u-carol", "City Airport", 55), &EscalationPolicy::disabled()),
            Err(DisputeError::StaleState { .. })
        ));
        assert!(matches!(
            case.add_evidence(submission("u-alice"), &EscalationPolicy::disabled()),
            Err(DisputeError::StaleState { .. })
        ));
        assert!(matches!(
            case.assign_panel(nominees(3)),
            Err(DisputeError::StaleState { .. })
        ));
        assert!(matches!(
            case.force_escalate("again", None),
            Err(DisputeError::StaleState { .. })
        ));
    }

    #[test]
    fn identical_vote_resubmission_keeps_version() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        let policy = EscalationPolicy::disabled();
        let first = case
            .cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(first.action, VoteAction::Applied);
        let second = case
            .cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(second.action, VoteAction::Unchanged);
        assert_eq!(second.version, first.version);
        assert_eq!(case.status, first.status);
    }

    #[test]
    fn vote_for_unregistered_claimant_fails() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        let err = case
            .cast_vote(
                &member("m0"),
                for_claimant("u-ghost"),
                None,
                &EscalationPolicy::disabled(),
            )
            .unwrap_err();
        assert!(matches!(err, DisputeError::UnknownClaimant { .. }));
    }

    #[test]
    fn vote_before_panel_fails() {
        let mut case = open_case();
        let err = case
            .cast_vote(
                &member("m0"),
                Vote::Abstain,
                None,
                &EscalationPolicy::disabled(),
            )
            .unwrap_err();
        assert!(matches!(err, DisputeError::PanelNotAssigned { .. }));
    }

    #[test]
    fn panel_assignment_is_one_time() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        assert!(matches!(
            case.assign_panel(nominees(5)),
            Err(DisputeError::PanelAlreadyAssigned { .. })
        ));
    }

    #[test]
    fn stolen_match_escalates_with_police() {
        let mut case = open_case();
        let mut s = submission("u-alice");
        s.evidence_type = crate::evidence::EvidenceType::SerialNumber;
        s.serial_number = Some("SN-0042".to_string());
        let (evidence_id, _) = case.add_evidence(s, &EscalationPolicy::disabled()).unwrap();
        let (_, version) = case
            .verify_evidence(
                &evidence_id,
                VerificationResult::Valid,
                Some(StolenMatch {
                    reference_id: Some("NCIC-77".to_string()),
                }),
                &EscalationPolicy::disabled(),
            )
            .unwrap();
        assert_eq!(case.status, DisputeStatus::Escalated);
        assert!(case.police_involved);
        assert!(case
            .escalation_reason
            .as_deref()
            .unwrap()
            .contains("stolen-property"));
        assert_eq!(version, case.version);
    }

    #[test]
    fn identical_reverification_does_not_bump_version() {
        let mut case = open_case();
        let (evidence_id, _) = case
            .add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        let (_, v1) = case
            .verify_evidence(
                &evidence_id,
                VerificationResult::Valid,
                None,
                &EscalationPolicy::disabled(),
            )
            .unwrap();
        let (action, v2) = case
            .verify_evidence(
                &evidence_id,
                VerificationResult::Valid,
                None,
                &EscalationPolicy::disabled(),
            )
            .unwrap();
        assert_eq!(action, VerifyAction::Unchanged);
        assert_eq!(v2, v1);
    }

    #[test]
    fn unresolved_tie_escalates() {
        let mut case = open_case();
        case.assign_panel(nominees(4)).unwrap();
        let policy = EscalationPolicy::disabled();
        // Two abstentions, then a 1-1 split at the quorum boundary with
        // equal trust and no verified evidence on either side.
        case.cast_vote(&member("m0"), Vote::Abstain, None, &policy).unwrap();
        case.cast_vote(&member("m1"), Vote::Abstain, None, &policy).unwrap();
        case.cast_vote(&member("m2"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        let outcome = case
            .cast_vote(&member("m3"), for_claimant("u-bob"), None, &policy)
            .unwrap();
        assert_eq!(outcome.status, DisputeStatus::Escalated);
        assert_eq!(case.escalation_reason.as_deref(), Some("unresolved tie"));
        assert!(!case.police_involved);
    }

    #[test]
    fn all_abstain_escalates_no_quorum() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        let policy = EscalationPolicy::disabled();
        case.cast_vote(&member("m0"), Vote::Abstain, None, &policy).unwrap();
        case.cast_vote(&member("m1"), Vote::Abstain, None, &policy).unwrap();
        let outcome = case
            .cast_vote(&member("m2"), Vote::Abstain, None, &policy)
            .unwrap();
        assert_eq!(outcome.status, DisputeStatus::Escalated);
        assert_eq!(
            case.escalation_reason.as_deref(),
            Some("no quorum achievable")
        );
    }

    #[test]
    fn sla_timeout_escalates_before_tally() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        // A negative window lapses immediately.
        let policy = EscalationPolicy::with_sla(chrono::Duration::seconds(-1));
        let outcome = case
            .cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(outcome.status, DisputeStatus::Escalated);
        assert_eq!(case.escalation_reason.as_deref(), Some("SLA timeout"));
    }

    #[test]
    fn sla_timeout_escalates_on_evidence_submission() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        // A negative window lapses immediately.
        let policy = EscalationPolicy::with_sla(chrono::Duration::seconds(-1));
        let (evidence_id, version) =
            case.add_evidence(submission("u-alice"), &policy).unwrap();
        assert_eq!(case.status, DisputeStatus::Escalated);
        assert_eq!(case.escalation_reason.as_deref(), Some("SLA timeout"));
        // The evidence landed in the same mutation that escalated.
        assert!(case.evidence.get(&evidence_id).is_some());
        assert_eq!(version, case.version);
    }

    #[test]
    fn sla_timeout_escalates_on_late_claimant() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        let policy = EscalationPolicy::with_sla(chrono::Duration::seconds(-1));
        case.add_claimant(claimant("u-carol", "City Airport", 55), &policy)
            .unwrap();
        assert_eq!(case.status, DisputeStatus::Escalated);
        assert_eq!(case.escalation_reason.as_deref(), Some("SLA timeout"));
        // The claimant was still registered.
        assert!(case.involved_enterprises.contains("City Airport"));
    }

    #[test]
    fn sla_timeout_escalates_on_verification() {
        let mut case = open_case();
        let (evidence_id, _) = case
            .add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        case.assign_panel(nominees(3)).unwrap();
        let policy = EscalationPolicy::with_sla(chrono::Duration::seconds(-1));
        let (action, _) = case
            .verify_evidence(&evidence_id, VerificationResult::Valid, None, &policy)
            .unwrap();
        assert_eq!(action, VerifyAction::Applied);
        assert_eq!(case.status, DisputeStatus::Escalated);
        assert_eq!(case.escalation_reason.as_deref(), Some("SLA timeout"));
    }

    #[test]
    fn sla_clock_starts_at_panel_assignment() {
        let mut case = open_case();
        // A lapsed window without a panel never fires: the clock runs from
        // panel assignment.
        let policy = EscalationPolicy::with_sla(chrono::Duration::seconds(-1));
        case.add_evidence(submission("u-alice"), &policy).unwrap();
        assert_eq!(case.status, DisputeStatus::UnderReview);
    }

    #[test]
    fn force_escalate_records_officer() {
        let mut case = open_case();
        case.force_escalate("owner dispute turned hostile", Some("Ofc. Reyes".to_string()))
            .unwrap();
        assert!(case.police_involved);
        assert_eq!(case.police_officer_name.as_deref(), Some("Ofc. Reyes"));
    }

    #[test]
    fn corrupted_state_freezes_the_case() {
        let mut case = open_case();
        // Simulate a corrupted persisted aggregate.
        case.status = DisputeStatus::Resolved;
        case.winning_claimant_id = None;
        assert!(matches!(
            case.check_integrity(),
            Err(DisputeError::CorruptedState { .. })
        ));
        assert!(matches!(
            case.add_evidence(submission("u-alice"), &EscalationPolicy::disabled()),
            Err(DisputeError::CorruptedState { .. })
        ));
    }

    #[test]
    fn version_increments_once_per_accepted_mutation() {
        let mut case = open_case();
        assert_eq!(case.version, 1);
        case.add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        assert_eq!(case.version, 2);
        case.assign_panel(nominees(3)).unwrap();
        assert_eq!(case.version, 3);
        let policy = EscalationPolicy::disabled();
        case.cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(case.version, 4);
        // Resolution happens inside the same vote mutation: one increment.
        case.cast_vote(&member("m1"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(case.version, 5);
        assert_eq!(case.status, DisputeStatus::Resolved);
    }

    #[test]
    fn aggregate_serde_roundtrip_mid_flight() {
        let mut case = open_case();
        case.add_evidence(submission("u-alice"), &EscalationPolicy::disabled())
            .unwrap();
        case.assign_panel(nominees(3)).unwrap();
        case.cast_vote(
            &member("m0"),
            for_claimant("u-alice"),
            Some("receipt matches".to_string()),
            &EscalationPolicy::disabled(),
        )
        .unwrap();
        let json = serde_json::to_string(&case).unwrap();
        let parsed: DisputeCase = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, case);
    }

    #[test]
    fn resolved_and_escalated_are_mutually_exclusive() {
        let mut case = open_case();
        case.assign_panel(nominees(3)).unwrap();
        let policy = EscalationPolicy::disabled();
        case.cast_vote(&member("m0"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        case.cast_vote(&member("m1"), for_claimant("u-alice"), None, &policy)
            .unwrap();
        assert_eq!(case.status, DisputeStatus::Resolved);
        assert!(case.escalation_reason.is_none());
        assert!(matches!(
            case.force_escalate("too late", None),
            Err(DisputeError::StaleState { .. })
        ));
    }
}
