//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the dispute engine. Type-level
//! distinction between identifier namespaces prevents cross-namespace
//! confusion — a `ClaimantId` cannot be passed where a `PanelMemberId` is
//! expected, which matters in a system where both are free-form ids issued
//! by external directories.
//!
//! Engine-owned identifiers (`DisputeId`, `EvidenceId`) are random UUIDs.
//! Externally issued identifiers (`ClaimantId` from the enterprise user
//! directories, `PanelMemberId` from the staffing service) are validated
//! string newtypes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for a dispute case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(Uuid);

impl DisputeId {
    /// Generate a new random dispute identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a dispute identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DisputeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute:{}", self.0)
    }
}

/// Unique identifier for an evidence item, assigned by the evidence ledger
/// at append time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(Uuid);

impl EvidenceId {
    /// Generate a new random evidence identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an evidence identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evidence:{}", self.0)
    }
}

/// Stable user identity of a claimant, issued by an enterprise user
/// directory.
///
/// Equality is exact; the claimant registry enforces *case-insensitive*
/// uniqueness on top of this type, because the enterprise directories do
/// not agree on casing conventions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimantId(String);

impl ClaimantId {
    /// Create a validated claimant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if the id is empty or
    /// whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "claimant id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for case-insensitive uniqueness checks.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for ClaimantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "claimant:{}", self.0)
    }
}

/// Identifier of a panel member, issued by the external staffing service.
///
/// Panel members are referenced by id; the staffing service owns the
/// underlying personnel records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelMemberId(String);

impl PanelMemberId {
    /// Create a validated panel member identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if the id is empty or
    /// whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "panel member id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PanelMemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panel-member:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispute_id_display_has_prefix() {
        let id = DisputeId::new();
        assert!(format!("{id}").starts_with("dispute:"));
    }

    #[test]
    fn dispute_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = DisputeId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn dispute_id_default_is_random() {
        assert_ne!(DisputeId::default(), DisputeId::default());
    }

    #[test]
    fn evidence_id_display_has_prefix() {
        let id = EvidenceId::new();
        assert!(format!("{id}").starts_with("evidence:"));
    }

    #[test]
    fn claimant_id_rejects_empty() {
        assert!(ClaimantId::new("").is_err());
        assert!(ClaimantId::new("   ").is_err());
    }

    #[test]
    fn claimant_id_normalized_lowercases() {
        let id = ClaimantId::new("U-Alice@Uni").unwrap();
        assert_eq!(id.normalized(), "u-alice@uni");
        assert_eq!(id.as_str(), "U-Alice@Uni");
    }

    #[test]
    fn panel_member_id_rejects_empty() {
        assert!(PanelMemberId::new("").is_err());
    }

    #[test]
    fn claimant_id_serde_roundtrip() {
        let id = ClaimantId::new("u-100").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ClaimantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn dispute_id_serde_roundtrip() {
        let id = DisputeId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: DisputeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
