//! # External Collaborator Adapters
//!
//! Abstract interfaces for the services the dispute engine consumes but
//! does not own: the trust-score service and the stolen-property registry.
//! Interfaces are behavior-only (no wire formats); a production deployment
//! plugs in HTTP adapters, tests and demos use the mocks below.
//!
//! Collaborator failures are never fatal to a dispute: the service layer
//! retries with backoff and then degrades (see [`crate::service`]).

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lfn_core::{ClaimantId, TrustScore};

/// Errors surfaced by collaborator adapters.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or returned a transient fault.
    #[error("collaborator unavailable: {reason}")]
    Unavailable {
        /// Transport-level or service-level failure description.
        reason: String,
    },

    /// The collaborator rejected the request as malformed.
    #[error("collaborator rejected request: {reason}")]
    Rejected {
        /// Why the request was rejected.
        reason: String,
    },
}

/// Result of a stolen-property registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialCheck {
    /// Whether the serial matched a stolen-property record.
    pub matched: bool,
    /// Registry reference for the matching record, when matched.
    pub reference_id: Option<String>,
}

/// Trust-score service: consulted once per claimant, at registration time.
pub trait TrustScoreService: Send + Sync {
    /// Fetch the current trust score for a claimant identity.
    fn trust_score(
        &self,
        claimant_id: &ClaimantId,
    ) -> impl Future<Output = Result<TrustScore, CollaboratorError>> + Send;
}

/// Stolen-property registry: consulted during verification of serial-number
/// evidence. Calls are asynchronous and bounded by a configured timeout.
pub trait StolenPropertyRegistry: Send + Sync {
    /// Check a serial number against the registry.
    fn check_serial(
        &self,
        serial: &str,
    ) -> impl Future<Output = Result<SerialCheck, CollaboratorError>> + Send;
}

// ── Mock adapters ──────────────────────────────────────────────────────

/// In-memory trust-score service with programmable scores, failure counts,
/// and latency.
#[derive(Debug, Default)]
pub struct MockTrustScoreService {
    scores: DashMap<String, TrustScore>,
    failures_remaining: AtomicU32,
    latency: Option<Duration>,
}

impl MockTrustScoreService {
    /// Mock with no scores configured; lookups fall back to a fixed score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the score returned for a claimant identity.
    pub fn set_score(&self, claimant_id: &ClaimantId, score: TrustScore) {
        self.scores.insert(claimant_id.normalized(), score);
    }

    /// Fail the next `count` calls with [`CollaboratorError::Unavailable`].
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Add artificial latency to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl TrustScoreService for MockTrustScoreService {
    async fn trust_score(
        &self,
        claimant_id: &ClaimantId,
    ) -> Result<TrustScore, CollaboratorError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_failure() {
            return Err(CollaboratorError::Unavailable {
                reason: "mock trust-score service failure".to_string(),
            });
        }
        Ok(self
            .scores
            .get(&claimant_id.normalized())
            .map(|entry| *entry)
            .unwrap_or(TrustScore::NEUTRAL))
    }
}

/// In-memory stolen-property registry with programmable matches, failure
/// counts, and latency.
#[derive(Debug, Default)]
pub struct MockStolenPropertyRegistry {
    matches: DashMap<String, Option<String>>,
    failures_remaining: AtomicU32,
    latency: Option<Duration>,
}

impl MockStolenPropertyRegistry {
    /// Mock with no stolen records; every serial comes back clean.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serial as stolen, with an optional registry reference.
    pub fn set_stolen(&self, serial: &str, reference_id: Option<String>) {
        self.matches.insert(serial.to_string(), reference_id);
    }

    /// Fail the next `count` calls with [`CollaboratorError::Unavailable`].
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Add artificial latency to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl StolenPropertyRegistry for MockStolenPropertyRegistry {
    async fn check_serial(&self, serial: &str) -> Result<SerialCheck, CollaboratorError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_failure() {
            return Err(CollaboratorError::Unavailable {
                reason: "mock stolen-property registry failure".to_string(),
            });
        }
        match self.matches.get(serial) {
            Some(entry) => Ok(SerialCheck {
                matched: true,
                reference_id: entry.value().clone(),
            }),
            None => Ok(SerialCheck {
                matched: false,
                reference_id: None,
            }),
        }
    }
}
