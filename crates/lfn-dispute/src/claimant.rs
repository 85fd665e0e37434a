//! # Claimant Registry
//!
//! Validates and stores the competing ownership claims registered against a
//! dispute. Uniqueness is case-insensitive on the claimant identity, with
//! the contact email as a fallback match: the enterprise user directories
//! feeding this system do not agree on casing conventions, and the same
//! person occasionally shows up under two directory ids but one mailbox.
//!
//! Insertion order is submission order and is preserved for audit purposes.
//! Claim status decisions (`Approved`/`Rejected`) are applied only by the
//! resolution path, never directly by callers.

use serde::{Deserialize, Serialize};

use lfn_core::{ClaimantId, EvidenceId, TrustScore};

use crate::error::DisputeError;

// ── Claim status ───────────────────────────────────────────────────────

/// Lifecycle status of a single ownership claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Claim registered, no panel review yet.
    Submitted,
    /// Dispute is under active review.
    UnderReview,
    /// Claim prevailed; the item is awarded to this claimant.
    Approved,
    /// Claim did not prevail.
    Rejected,
}

impl ClaimStatus {
    /// String form used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Claimant ───────────────────────────────────────────────────────────

/// A single competing ownership claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimant {
    /// Stable user identity from an enterprise directory.
    pub id: ClaimantId,
    /// Display name of the claimant.
    pub display_name: String,
    /// Enterprise the claimant belongs to (university, transit authority,
    /// airport security agency).
    pub enterprise: String,
    /// Contact email, used as a fallback duplicate-detection key.
    pub contact_email: Option<String>,
    /// Free-text description of the ownership claim.
    pub claim_description: String,
    /// Trust score captured at registration time. Never updated
    /// retroactively, so a tie-break audited later reads the same inputs.
    pub trust_score_snapshot: TrustScore,
    /// Current status of this claim.
    pub claim_status: ClaimStatus,
    /// Evidence items submitted by this claimant, in submission order.
    pub evidence_ids: Vec<EvidenceId>,
}

impl Claimant {
    /// Create a claimant in the `Submitted` state with no evidence.
    pub fn new(
        id: ClaimantId,
        display_name: impl Into<String>,
        enterprise: impl Into<String>,
        contact_email: Option<String>,
        claim_description: impl Into<String>,
        trust_score_snapshot: TrustScore,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            enterprise: enterprise.into(),
            contact_email,
            claim_description: claim_description.into(),
            trust_score_snapshot,
            claim_status: ClaimStatus::Submitted,
            evidence_ids: Vec::new(),
        }
    }

    /// Lowercased contact email, if any, for duplicate detection.
    fn normalized_email(&self) -> Option<String> {
        self.contact_email.as_ref().map(|e| e.to_lowercase())
    }
}

// ── Registry ───────────────────────────────────────────────────────────

/// Ordered collection of claimants with uniqueness enforcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimantRegistry {
    claimants: Vec<Claimant>,
}

impl ClaimantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new claimant.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::DuplicateClaimant`] when the identity matches
    /// an existing claimant case-insensitively, or when the contact email
    /// matches an existing claimant's email.
    pub fn register(&mut self, claimant: Claimant) -> Result<(), DisputeError> {
        let id_key = claimant.id.normalized();
        let email_key = claimant.normalized_email();
        for existing in &self.claimants {
            let same_id = existing.id.normalized() == id_key;
            let same_email = match (&email_key, existing.normalized_email()) {
                (Some(a), Some(b)) => *a == b,
                _ => false,
            };
            if same_id || same_email {
                return Err(DisputeError::DuplicateClaimant {
                    claimant_id: claimant.id.as_str().to_string(),
                });
            }
        }
        self.claimants.push(claimant);
        Ok(())
    }

    /// Look up a claimant by exact identity.
    pub fn get(&self, id: &ClaimantId) -> Option<&Claimant> {
        self.claimants.iter().find(|c| c.id == *id)
    }

    /// Whether the registry contains a claimant matched case-insensitively.
    pub fn contains(&self, id: &ClaimantId) -> bool {
        let key = id.normalized();
        self.claimants.iter().any(|c| c.id.normalized() == key)
    }

    /// Claimants in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &Claimant> {
        self.claimants.iter()
    }

    /// Number of registered claimants.
    pub fn len(&self) -> usize {
        self.claimants.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.claimants.is_empty()
    }

    /// Link an evidence item to the claimant that submitted it. No-op when
    /// the submitter is not a registered claimant (investigator submissions).
    pub(crate) fn link_evidence(&mut self, submitter: &str, evidence_id: EvidenceId) {
        let key = submitter.to_lowercase();
        if let Some(claimant) = self
            .claimants
            .iter_mut()
            .find(|c| c.id.normalized() == key)
        {
            claimant.evidence_ids.push(evidence_id);
        }
    }

    /// Mark all claims as under review. Invoked on the transition into
    /// `UNDER_REVIEW`.
    pub(crate) fn mark_under_review(&mut self) {
        for claimant in &mut self.claimants {
            if claimant.claim_status == ClaimStatus::Submitted {
                claimant.claim_status = ClaimStatus::UnderReview;
            }
        }
    }

    /// Apply the resolution decision: the winner is approved, every other
    /// claim is rejected. Invoked only by the resolution path.
    pub(crate) fn mark_decision(&mut self, winner: &ClaimantId) {
        for claimant in &mut self.claimants {
            claimant.claim_status = if claimant.id == *winner {
                ClaimStatus::Approved
            } else {
                ClaimStatus::Rejected
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claimant(id: &str, enterprise: &str, email: Option<&str>) -> Claimant {
        Claimant::new(
            ClaimantId::new(id).unwrap(),
            format!("User {id}"),
            enterprise,
            email.map(str::to_string),
            "it is mine",
            TrustScore::new(60).unwrap(),
        )
    }

    #[test]
    fn register_preserves_insertion_order() {
        let mut registry = ClaimantRegistry::new();
        registry.register(claimant("u-b", "University", None)).unwrap();
        registry.register(claimant("u-a", "Transit", None)).unwrap();
        let ids: Vec<&str> = registry.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["u-b", "u-a"]);
    }

    #[test]
    fn duplicate_id_is_case_insensitive() {
        let mut registry = ClaimantRegistry::new();
        registry.register(claimant("U-Alice", "University", None)).unwrap();
        let err = registry
            .register(claimant("u-alice", "Transit", None))
            .unwrap_err();
        assert!(matches!(err, DisputeError::DuplicateClaimant { .. }));
    }

    #[test]
    fn duplicate_email_is_fallback_match() {
        let mut registry = ClaimantRegistry::new();
        registry
            .register(claimant("u-1", "University", Some("Alice@Uni.edu")))
            .unwrap();
        let err = registry
            .register(claimant("u-2", "Transit", Some("alice@uni.edu")))
            .unwrap_err();
        assert!(matches!(err, DisputeError::DuplicateClaimant { .. }));
    }

    #[test]
    fn missing_email_never_matches() {
        let mut registry = ClaimantRegistry::new();
        registry.register(claimant("u-1", "University", None)).unwrap();
        assert!(registry.register(claimant("u-2", "Transit", None)).is_ok());
    }

    #[test]
    fn mark_decision_approves_winner_rejects_rest() {
        let mut registry = ClaimantRegistry::new();
        registry.register(claimant("u-1", "University", None)).unwrap();
        registry.register(claimant("u-2", "Transit", None)).unwrap();
        let winner = ClaimantId::new("u-1").unwrap();
        registry.mark_decision(&winner);
        assert_eq!(
            registry.get(&winner).unwrap().claim_status,
            ClaimStatus::Approved
        );
        assert_eq!(
            registry
                .get(&ClaimantId::new("u-2").unwrap())
                .unwrap()
                .claim_status,
            ClaimStatus::Rejected
        );
    }

    #[test]
    fn link_evidence_ignores_non_claimants() {
        let mut registry = ClaimantRegistry::new();
        registry.register(claimant("u-1", "University", None)).unwrap();
        let ev = lfn_core::EvidenceId::new();
        registry.link_evidence("investigator-9", ev.clone());
        assert!(registry
            .get(&ClaimantId::new("u-1").unwrap())
            .unwrap()
            .evidence_ids
            .is_empty());
        registry.link_evidence("U-1", ev);
        assert_eq!(
            registry
                .get(&ClaimantId::new("u-1").unwrap())
                .unwrap()
                .evidence_ids
                .len(),
            1
        );
    }

    #[test]
    fn registry_serde_roundtrip() {
        let mut registry = ClaimantRegistry::new();
        registry
            .register(claimant("u-1", "University", Some("a@b.c")))
            .unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let parsed: ClaimantRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, registry);
    }
}
