//! # Verification Panel
//!
//! Manages the adjudicator panel assigned to a dispute and records votes.
//! The panel is assigned once by an external staffing process, its size is
//! fixed for the dispute's lifetime, and the quorum threshold is derived at
//! assignment time: a simple majority of the panel size, with a minimum
//! panel of three.
//!
//! Each member holds at most one *effective* vote. A resubmission replaces
//! the prior vote; an identical resubmission is a recognized no-op so that
//! retried deliveries never double-count or bump the aggregate version.

use serde::{Deserialize, Serialize};

use lfn_core::{ClaimantId, PanelMemberId, Timestamp};

use crate::error::DisputeError;

// ── Votes ──────────────────────────────────────────────────────────────

/// A panel member's vote: a claimant they believe should prevail, or an
/// explicit abstention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Vote for the named claimant.
    ForClaimant(ClaimantId),
    /// Abstain; counts toward panel exhaustion but not toward quorum.
    Abstain,
}

impl Vote {
    /// Whether this vote is an abstention.
    pub fn is_abstain(&self) -> bool {
        matches!(self, Vote::Abstain)
    }

    /// The claimant voted for, if not an abstention.
    pub fn claimant(&self) -> Option<&ClaimantId> {
        match self {
            Vote::ForClaimant(id) => Some(id),
            Vote::Abstain => None,
        }
    }
}

/// Whether a vote call changed the panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// A new or replacing vote was recorded.
    Applied,
    /// The identical vote was already recorded; nothing changed.
    Unchanged,
}

// ── Members ────────────────────────────────────────────────────────────

/// Candidate supplied by the staffing collaborator at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelNominee {
    /// Staffing-service identifier.
    pub id: PanelMemberId,
    /// Display name.
    pub name: String,
    /// Role within their enterprise (e.g., "security officer").
    pub role: String,
    /// Enterprise the member represents.
    pub enterprise: String,
}

/// A seated panel member with their voting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMember {
    /// Staffing-service identifier.
    pub id: PanelMemberId,
    /// Display name.
    pub name: String,
    /// Role within their enterprise.
    pub role: String,
    /// Enterprise the member represents.
    pub enterprise: String,
    /// Whether an effective vote has been recorded.
    pub has_voted: bool,
    /// The current effective vote.
    pub vote: Option<Vote>,
    /// Free-text justification supplied with the vote.
    pub vote_reason: Option<String>,
    /// Timestamp of the most recent vote recording.
    pub voted_at: Option<Timestamp>,
}

impl PanelMember {
    fn seat(nominee: PanelNominee) -> Self {
        Self {
            id: nominee.id,
            name: nominee.name,
            role: nominee.role,
            enterprise: nominee.enterprise,
            has_voted: false,
            vote: None,
            vote_reason: None,
            voted_at: None,
        }
    }
}

// ── Panel ──────────────────────────────────────────────────────────────

/// The adjudicator panel for one dispute. Composition is immutable after
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPanel {
    members: Vec<PanelMember>,
    /// Quorum threshold: non-abstaining votes needed before tallying.
    pub votes_required: u32,
    /// Assignment time, the anchor for the SLA window.
    pub assigned_at: Timestamp,
}

impl VerificationPanel {
    /// Seat a panel from the staffing service's nominees.
    ///
    /// `votes_required` is fixed here as `ceil(panel_size / 2)`.
    ///
    /// # Errors
    ///
    /// - [`DisputeError::PanelTooSmall`] for fewer than three nominees.
    /// - [`DisputeError::DuplicatePanelMember`] when a member id repeats.
    pub fn assign(nominees: Vec<PanelNominee>) -> Result<Self, DisputeError> {
        if nominees.len() < 3 {
            return Err(DisputeError::PanelTooSmall {
                size: nominees.len(),
            });
        }
        for (i, nominee) in nominees.iter().enumerate() {
            if nominees[..i].iter().any(|n| n.id == nominee.id) {
                return Err(DisputeError::DuplicatePanelMember {
                    member_id: nominee.id.as_str().to_string(),
                });
            }
        }
        let votes_required = ((nominees.len() + 1) / 2) as u32;
        Ok(Self {
            members: nominees.into_iter().map(PanelMember::seat).collect(),
            votes_required,
            assigned_at: Timestamp::now(),
        })
    }

    /// Record a member's vote. Resubmission replaces the prior vote; an
    /// identical resubmission (same vote, same reason) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::UnknownPanelMember`] for ids not on the panel.
    pub fn record_vote(
        &mut self,
        member_id: &PanelMemberId,
        vote: Vote,
        reason: Option<String>,
    ) -> Result<VoteAction, DisputeError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == *member_id)
            .ok_or_else(|| DisputeError::UnknownPanelMember {
                member_id: member_id.as_str().to_string(),
            })?;
        if member.has_voted && member.vote.as_ref() == Some(&vote) && member.vote_reason == reason {
            return Ok(VoteAction::Unchanged);
        }
        member.has_voted = true;
        member.vote = Some(vote);
        member.vote_reason = reason;
        member.voted_at = Some(Timestamp::now());
        Ok(VoteAction::Applied)
    }

    /// Members in seating order.
    pub fn members(&self) -> &[PanelMember] {
        &self.members
    }

    /// Panel size, fixed at assignment.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Count of recorded non-abstaining votes.
    pub fn non_abstaining_count(&self) -> u32 {
        self.members
            .iter()
            .filter(|m| m.vote.as_ref().is_some_and(|v| !v.is_abstain()))
            .count() as u32
    }

    /// Whether every member has voted (including abstentions). Drives the
    /// "no quorum achievable" deadlock.
    pub fn all_voted(&self) -> bool {
        self.members.iter().all(|m| m.has_voted)
    }
}
