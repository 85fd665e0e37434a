//! # Resolution Engine
//!
//! Tallies panel votes once quorum is reached and computes the dispute
//! outcome. The winner is the claimant with the strict plurality of
//! non-abstaining votes; ties are broken first by the higher trust-score
//! snapshot, then by the count of VALID-verified evidence items. A tie that
//! survives both rules deadlocks: real ownership disputes are escalated to a
//! human, never resolved by coin flip.
//!
//! The tally reads only the final recorded state (last effective vote per
//! member), so the outcome is independent of vote arrival order.

use serde::{Deserialize, Serialize};

use lfn_core::ClaimantId;

use crate::claimant::ClaimantRegistry;
use crate::evidence::EvidenceLedger;
use crate::panel::VerificationPanel;

// ── Outcome types ──────────────────────────────────────────────────────

/// Which tie-break rule decided the winner, when the plurality was tied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    /// Higher trust-score snapshot prevailed.
    TrustScore,
    /// More VALID-verified evidence items prevailed.
    ValidEvidenceCount,
}

impl TieBreakRule {
    /// String form used in resolution reasons.
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreakRule::TrustScore => "higher trust score",
            TieBreakRule::ValidEvidenceCount => "more verified evidence",
        }
    }
}

/// Why a quorum tally could not produce a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlockReason {
    /// Plurality tie survived both tie-break rules.
    UnresolvedTie,
    /// Every member voted but non-abstaining votes stayed below quorum.
    NoQuorumAchievable,
}

impl DeadlockReason {
    /// Escalation reason string recorded on the dispute.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlockReason::UnresolvedTie => "unresolved tie",
            DeadlockReason::NoQuorumAchievable => "no quorum achievable",
        }
    }
}

/// A decisive tally outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The prevailing claimant.
    pub winning_claimant_id: ClaimantId,
    /// Votes the winner received.
    pub vote_count: u32,
    /// Total non-abstaining votes at tally time.
    pub total_non_abstaining: u32,
    /// Tie-break rule applied, if the plurality was tied.
    pub tie_break: Option<TieBreakRule>,
    /// Per-claimant vote counts in registration order, for the audit notes.
    pub tally: Vec<(ClaimantId, u32)>,
}

/// Result of evaluating the panel state after a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyOutcome {
    /// Quorum not yet reached and the panel is not exhausted; keep waiting.
    NoQuorum,
    /// A decisive winner.
    Winner(Resolution),
    /// Quorum logic deadlocked; the dispute escalates.
    Deadlock(DeadlockReason),
}

// ── Evaluation ─────────────────────────────────────────────────────────

/// Evaluate the panel after an accepted vote.
///
/// Votes for claimants are guaranteed registered by the aggregate's vote
/// validation, so an unmatched vote here simply contributes nothing.
pub fn evaluate(
    panel: &VerificationPanel,
    registry: &ClaimantRegistry,
    ledger: &EvidenceLedger,
) -> TallyOutcome {
    let non_abstaining = panel.non_abstaining_count();
    if non_abstaining < panel.votes_required {
        if panel.all_voted() {
            return TallyOutcome::Deadlock(DeadlockReason::NoQuorumAchievable);
        }
        return TallyOutcome::NoQuorum;
    }

    // Count in registration order so the tally is deterministic.
    let tally: Vec<(ClaimantId, u32)> = registry
        .iter()
        .map(|claimant| {
            let count = panel
                .members()
                .iter()
                .filter_map(|m| m.vote.as_ref().and_then(|v| v.claimant()))
                .filter(|voted_for| voted_for.normalized() == claimant.id.normalized())
                .count() as u32;
            (claimant.id.clone(), count)
        })
        .collect();

    let top = match tally.iter().map(|(_, c)| *c).max() {
        Some(top) if top > 0 => top,
        // Non-abstaining votes exist, so a positive count always exists;
        // defensive arm for an empty registry.
        _ => return TallyOutcome::Deadlock(DeadlockReason::UnresolvedTie),
    };
    let leaders: Vec<&ClaimantId> = tally
        .iter()
        .filter(|(_, c)| *c == top)
        .map(|(id, _)| id)
        .collect();

    let (winner, tie_break) = if leaders.len() == 1 {
        (leaders[0].clone(), None)
    } else {
        match break_tie(&leaders, registry, ledger) {
            Some(decided) => decided,
            None => return TallyOutcome::Deadlock(DeadlockReason::UnresolvedTie),
        }
    };

    TallyOutcome::Winner(Resolution {
        winning_claimant_id: winner,
        vote_count: top,
        total_non_abstaining: non_abstaining,
        tie_break,
        tally,
    })
}

/// Apply the tie-break ladder to the plurality leaders: trust-score
/// snapshot first, then VALID-verified evidence count. Returns `None` when
/// both rules leave more than one leader standing.
fn break_tie(
    leaders: &[&ClaimantId],
    registry: &ClaimantRegistry,
    ledger: &EvidenceLedger,
) -> Option<(ClaimantId, Option<TieBreakRule>)> {
    let by_trust = survivors(leaders, |id| {
        registry
            .get(id)
            .map(|c| u32::from(c.trust_score_snapshot.value()))
            .unwrap_or(0)
    });
    if by_trust.len() == 1 {
        return Some((by_trust[0].clone(), Some(TieBreakRule::TrustScore)));
    }

    let by_evidence = survivors(&by_trust, |id| {
        registry
            .get(id)
            .map(|c| ledger.valid_evidence_count(&c.evidence_ids) as u32)
            .unwrap_or(0)
    });
    if by_evidence.len() == 1 {
        return Some((by_evidence[0].clone(), Some(TieBreakRule::ValidEvidenceCount)));
    }
    None
}

/// The leaders achieving the maximum of `metric`, preserving order.
fn survivors<'a>(
    leaders: &[&'a ClaimantId],
    metric: impl Fn(&ClaimantId) -> u32,
) -> Vec<&'a ClaimantId> {
    let best = leaders.iter().map(|id| metric(id)).max().unwrap_or(0);
    leaders
        .iter()
        .filter(|id| metric(id) == best)
        .copied()
        .collect()
}
