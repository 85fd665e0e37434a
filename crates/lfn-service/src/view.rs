//! Read-side views over dispute aggregates.

use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

use lfn_core::{ClaimantId, Timestamp};
use lfn_dispute::{
    Claimant, DisputeCase, DisputeStatus, DisputeType, EvidenceItem, ItemSnapshot,
    TransitionRecord, VerificationPanel,
};

/// Serializable snapshot of a whole dispute aggregate, including the
/// optimistic concurrency `version` the caller must echo back on writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeView {
    /// Dispute identifier, rendered with its `dispute:` prefix.
    pub dispute_id: String,
    /// Lifecycle state.
    pub status: DisputeStatus,
    /// Dispute category.
    pub dispute_type: DisputeType,
    /// Why the dispute was opened.
    pub dispute_reason: String,
    /// Identity of whoever opened the dispute.
    pub initiated_by: String,
    /// Snapshot of the disputed item.
    pub item: ItemSnapshot,
    /// Distinct enterprises of all registered claimants.
    pub involved_enterprises: BTreeSet<String>,
    /// Competing claims, in submission order.
    pub claimants: Vec<Claimant>,
    /// Evidence, in submission order.
    pub evidence: Vec<EvidenceItem>,
    /// Adjudicator panel, if assigned.
    pub panel: Option<VerificationPanel>,
    /// Quorum threshold, once a panel is assigned.
    pub votes_required: Option<u32>,
    /// The prevailing claimant, on resolved disputes.
    pub winning_claimant_id: Option<ClaimantId>,
    /// Human-readable decision, on resolved disputes.
    pub resolution_decision: Option<String>,
    /// How the decision was reached.
    pub resolution_reason: Option<String>,
    /// Tally notes for the audit trail.
    pub resolution_notes: Option<String>,
    /// Why the dispute escalated, on escalated disputes.
    pub escalation_reason: Option<String>,
    /// Whether law enforcement is involved.
    pub police_involved: bool,
    /// Officer handling the escalation, when known.
    pub police_officer_name: Option<String>,
    /// When the dispute was opened.
    pub opened_at: Timestamp,
    /// When the aggregate last accepted a mutation.
    pub updated_at: Timestamp,
    /// Optimistic concurrency token.
    pub version: u64,
    /// Append-only state transition audit trail.
    pub transition_log: Vec<TransitionRecord>,
}

impl From<&DisputeCase> for DisputeView {
    fn from(case: &DisputeCase) -> Self {
        Self {
            dispute_id: case.id.to_string(),
            status: case.status,
            dispute_type: case.dispute_type,
            dispute_reason: case.dispute_reason.clone(),
            initiated_by: case.initiated_by.clone(),
            item: case.item.clone(),
            involved_enterprises: case.involved_enterprises.clone(),
            claimants: case.claimants.iter().cloned().collect(),
            evidence: case.evidence.iter().cloned().collect(),
            panel: case.panel.clone(),
            votes_required: case.votes_required(),
            winning_claimant_id: case.winning_claimant_id.clone(),
            resolution_decision: case.resolution_decision.clone(),
            resolution_reason: case.resolution_reason.clone(),
            resolution_notes: case.resolution_notes.clone(),
            escalation_reason: case.escalation_reason.clone(),
            police_involved: case.police_involved,
            police_officer_name: case.police_officer_name.clone(),
            opened_at: case.opened_at,
            updated_at: case.updated_at,
            version: case.version,
            transition_log: case.transition_log.clone(),
        }
    }
}

/// Filter for [`crate::service::DisputeService::list_disputes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisputeFilter {
    /// Keep only disputes in this state.
    pub status: Option<DisputeStatus>,
    /// Keep only disputes this identity participates in, as a claimant or
    /// panel member (case-insensitive).
    pub participant: Option<String>,
}

impl DisputeFilter {
    /// Whether a dispute matches this filter.
    pub fn matches(&self, case: &DisputeCase) -> bool {
        if let Some(status) = self.status {
            if case.status != status {
                return false;
            }
        }
        if let Some(participant) = &self.participant {
            let key = participant.to_lowercase();
            let is_claimant = case
                .claimants
                .iter()
                .any(|c| c.id.normalized() == key);
            let is_panel_member = case.panel.as_ref().is_some_and(|panel| {
                panel
                    .members()
                    .iter()
                    .any(|m| m.id.as_str().to_lowercase() == key)
            });
            if !is_claimant && !is_panel_member {
                return false;
            }
        }
        true
    }
}
