//! # Evidence Ledger
//!
//! Append-only, per-dispute ordered store of supporting evidence. Items are
//! assigned an id and a timestamp at append time and are retained in
//! submission order for audit purposes. The single permitted mutation on an
//! existing item is verification, allowed exactly once: re-verification with
//! an identical result is an accepted no-op, a conflicting result fails.
//!
//! ## Security Invariant
//!
//! A verified item is immutable. There is no path that flips a recorded
//! `VALID` to `INVALID` or vice versa; a disputed verification is handled by
//! escalating the case, not by editing the ledger.

use serde::{Deserialize, Serialize};

use lfn_core::{EvidenceId, Timestamp};

use crate::error::DisputeError;

// ── Evidence classification ────────────────────────────────────────────

/// Category of a piece of supporting evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceType {
    /// Purchase receipt or proof of payment.
    Receipt,
    /// Photograph of the item or of the claimant with the item.
    Photo,
    /// Manufacturer serial number. Subject to the stolen-property check.
    SerialNumber,
    /// Witness statement.
    Witness,
    /// Anything that does not fit the other categories.
    Other,
}

impl EvidenceType {
    /// String form used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Receipt => "RECEIPT",
            EvidenceType::Photo => "PHOTO",
            EvidenceType::SerialNumber => "SERIAL_NUMBER",
            EvidenceType::Witness => "WITNESS",
            EvidenceType::Other => "OTHER",
        }
    }

    /// All evidence types, for enumeration in views.
    pub fn all() -> &'static [EvidenceType] {
        &[
            EvidenceType::Receipt,
            EvidenceType::Photo,
            EvidenceType::SerialNumber,
            EvidenceType::Witness,
            EvidenceType::Other,
        ]
    }
}

impl std::fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a single evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationResult {
    /// Not yet verified, or verification degraded (collaborator timeout).
    Pending,
    /// Verified as genuine support for the claim.
    Valid,
    /// Verified and found not to support the claim.
    Invalid,
}

impl VerificationResult {
    /// String form used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationResult::Pending => "PENDING",
            VerificationResult::Valid => "VALID",
            VerificationResult::Invalid => "INVALID",
        }
    }
}

impl std::fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Evidence item ──────────────────────────────────────────────────────

/// A single ledger entry. Immutable once `verified == true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Ledger-assigned identifier.
    pub id: EvidenceId,
    /// Identity of the submitter. Usually a claimant id, but investigators
    /// submit evidence too, so this is not constrained to the registry.
    pub submitted_by: String,
    /// Display name of the submitter.
    pub submitter_name: String,
    /// Evidence category.
    pub evidence_type: EvidenceType,
    /// Free-text description.
    pub description: String,
    /// Optional reference to an externally stored document.
    pub document_ref: Option<String>,
    /// Serial number, required for [`EvidenceType::SerialNumber`] items.
    pub serial_number: Option<String>,
    /// Whether a verification outcome has been recorded.
    pub verified: bool,
    /// Recorded verification outcome.
    pub verification_result: VerificationResult,
    /// Ledger-assigned submission timestamp.
    pub submitted_at: Timestamp,
}

/// Validated payload for appending evidence to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    /// Identity of the submitter.
    pub submitted_by: String,
    /// Display name of the submitter.
    pub submitter_name: String,
    /// Evidence category.
    pub evidence_type: EvidenceType,
    /// Free-text description.
    pub description: String,
    /// Optional reference to an externally stored document.
    pub document_ref: Option<String>,
    /// Serial number, required when `evidence_type` is `SerialNumber`.
    pub serial_number: Option<String>,
}

impl EvidenceSubmission {
    fn validate(&self) -> Result<(), DisputeError> {
        if self.submitted_by.trim().is_empty() {
            return Err(DisputeError::MalformedEvidence {
                reason: "submitter identity must not be empty".to_string(),
            });
        }
        if self.description.trim().is_empty() {
            return Err(DisputeError::MalformedEvidence {
                reason: "description must not be empty".to_string(),
            });
        }
        if self.evidence_type == EvidenceType::SerialNumber
            && self
                .serial_number
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
        {
            return Err(DisputeError::MalformedEvidence {
                reason: "SERIAL_NUMBER evidence must carry a serial number".to_string(),
            });
        }
        Ok(())
    }
}

/// Whether a verification call changed the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyAction {
    /// The verification outcome was recorded.
    Applied,
    /// The identical outcome was already recorded; nothing changed.
    Unchanged,
}

// ── Ledger ─────────────────────────────────────────────────────────────

/// Append-only ordered evidence store for one dispute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceLedger {
    items: Vec<EvidenceItem>,
}

impl EvidenceLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated submission, assigning id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::MalformedEvidence`] when the payload fails
    /// structural validation.
    pub fn append(&mut self, submission: EvidenceSubmission) -> Result<&EvidenceItem, DisputeError> {
        submission.validate()?;
        let item = EvidenceItem {
            id: EvidenceId::new(),
            submitted_by: submission.submitted_by,
            submitter_name: submission.submitter_name,
            evidence_type: submission.evidence_type,
            description: submission.description,
            document_ref: submission.document_ref,
            serial_number: submission.serial_number,
            verified: false,
            verification_result: VerificationResult::Pending,
            submitted_at: Timestamp::now(),
        };
        self.items.push(item);
        // Just pushed, so the ledger is non-empty.
        Ok(&self.items[self.items.len() - 1])
    }

    /// Record a verification outcome for an item. Permitted exactly once:
    /// an identical re-verification is an accepted no-op.
    ///
    /// # Errors
    ///
    /// - [`DisputeError::UnknownEvidence`] if the id is not in this ledger.
    /// - [`DisputeError::MalformedEvidence`] when the requested result is
    ///   `Pending` (verification must decide, not defer).
    /// - [`DisputeError::AlreadyVerified`] when a different outcome was
    ///   already recorded.
    pub fn verify(
        &mut self,
        evidence_id: &EvidenceId,
        result: VerificationResult,
    ) -> Result<VerifyAction, DisputeError> {
        if result == VerificationResult::Pending {
            return Err(DisputeError::MalformedEvidence {
                reason: "verification result must be VALID or INVALID".to_string(),
            });
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == *evidence_id)
            .ok_or_else(|| DisputeError::UnknownEvidence {
                evidence_id: evidence_id.to_string(),
            })?;
        if item.verified {
            if item.verification_result == result {
                return Ok(VerifyAction::Unchanged);
            }
            return Err(DisputeError::AlreadyVerified {
                evidence_id: evidence_id.to_string(),
                result: item.verification_result.as_str().to_string(),
            });
        }
        item.verified = true;
        item.verification_result = result;
        Ok(VerifyAction::Applied)
    }

    /// Look up an item by id.
    pub fn get(&self, evidence_id: &EvidenceId) -> Option<&EvidenceItem> {
        self.items.iter().find(|i| i.id == *evidence_id)
    }

    /// Items in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.iter()
    }

    /// Number of ledger entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count of `VALID`-verified items among the given ids. Tie-break input.
    pub fn valid_evidence_count(&self, evidence_ids: &[EvidenceId]) -> usize {
        evidence_ids
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|i| i.verified && i.verification_result == VerificationResult::Valid)
            .count()
    }
}
