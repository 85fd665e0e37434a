//! # Trust Score
//!
//! A validated 0–100 trust score. The dispute engine consumes trust scores
//! from an external service and snapshots them on the claimant record at
//! registration time; the snapshot is never updated retroactively, so a
//! tie-break decided today reads the same inputs when audited next year.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A trust score in the inclusive range 0–100.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrustScore(u8);

impl TrustScore {
    /// Neutral midpoint, used when the trust-score collaborator fails
    /// persistently and no last-known value exists.
    pub const NEUTRAL: TrustScore = TrustScore(50);

    /// Create a validated trust score.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrustScoreOutOfRange`] for values above 100.
    pub fn new(value: u16) -> Result<Self, CoreError> {
        if value > 100 {
            return Err(CoreError::TrustScoreOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    /// The score as a plain integer.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for TrustScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
