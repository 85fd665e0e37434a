//! # Dispute Service
//!
//! The exposed function-level API over the dispute engine. Wires the
//! aggregate store, the external collaborators (trust scores, stolen-
//! property registry), and the configured escalation policy together.
//!
//! ## Concurrency
//!
//! Every mutating call takes the caller's expected `version` and runs the
//! whole read-validate-mutate sequence inside the store's write-locked
//! closure, failing with [`ServiceError::VersionConflict`] on mismatch.
//! Collaborator calls are awaited *before* the closure runs, so the lock is
//! never held across an `.await` and a pending stolen-property check never
//! blocks vote processing on the same dispute.
//!
//! ## Degrade policy
//!
//! Collaborator failures are never fatal to a dispute. Trust-score fetches
//! fall back to the last-known value for that identity, then to
//! [`TrustScore::NEUTRAL`]. Stolen-property checks that time out or fail
//! persistently leave the verification `PENDING` and the evidence
//! unresolved, without halting voting.

use std::time::Duration;

use dashmap::DashMap;

use lfn_core::{ClaimantId, DisputeId, EvidenceId, PanelMemberId, TrustScore};
use lfn_dispute::{
    Claimant, DisputeCase, DisputeError, DisputeStatus, DisputeType, EscalationPolicy,
    EvidenceSubmission, EvidenceType, ItemSnapshot, PanelNominee, StolenMatch,
    VerificationResult, VerifyAction, Vote, VoteOutcome,
};

use crate::collaborators::{StolenPropertyRegistry, TrustScoreService};
use crate::error::ServiceError;
use crate::retry::retry_with_backoff;
use crate::store::DisputeStore;
use crate::view::{DisputeFilter, DisputeView};

/// Deployment configuration for the dispute service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum deliberation window after panel assignment; `None` disables
    /// SLA escalation.
    pub sla_timeout: Option<chrono::Duration>,
    /// Per-call budget for a collaborator round trip, retries included.
    pub collaborator_timeout: Duration,
    /// Retry attempts after the initial collaborator call.
    pub max_retries: u32,
    /// Base backoff delay; doubles per attempt.
    pub retry_base_delay: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sla_timeout: None,
            collaborator_timeout: Duration::from_secs(2),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

/// Claimant registration payload. The service fetches the trust-score
/// snapshot itself; callers never supply one.
#[derive(Debug, Clone)]
pub struct NewClaimant {
    /// Stable user identity from an enterprise directory.
    pub id: ClaimantId,
    /// Display name.
    pub display_name: String,
    /// Enterprise the claimant belongs to.
    pub enterprise: String,
    /// Contact email, used as a fallback duplicate-detection key.
    pub contact_email: Option<String>,
    /// Free-text description of the ownership claim.
    pub claim_description: String,
}

/// Outcome of a `verify_evidence` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The verification was applied to the live aggregate.
    Applied {
        /// Whether the ledger changed (identical re-verification is a no-op).
        action: VerifyAction,
        /// Dispute status after the mutation (escalated on a stolen match).
        status: DisputeStatus,
        /// Aggregate version after the mutation.
        version: u64,
    },
    /// The dispute reached a terminal state while the stolen-property check
    /// was in flight; the result was logged for audit and the case was not
    /// re-opened.
    AuditOnly {
        /// The terminal status encountered.
        status: DisputeStatus,
    },
    /// The stolen-property check timed out or failed persistently; the
    /// verification stays `PENDING` and the evidence remains unresolved.
    Deferred,
}

/// The dispute service: store + collaborators + policy.
pub struct DisputeService<T, R> {
    store: DisputeStore,
    trust_scores: T,
    stolen_registry: R,
    config: ServiceConfig,
    /// Last successfully fetched trust score per claimant identity, the
    /// first degrade fallback.
    last_known_trust: DashMap<String, TrustScore>,
}

impl<T: TrustScoreService, R: StolenPropertyRegistry> DisputeService<T, R> {
    /// Create a service over an empty store.
    pub fn new(trust_scores: T, stolen_registry: R, config: ServiceConfig) -> Self {
        Self {
            store: DisputeStore::new(),
            trust_scores,
            stolen_registry,
            config,
            last_known_trust: DashMap::new(),
        }
    }

    /// The underlying store, for sharing with read-side consumers.
    pub fn store(&self) -> &DisputeStore {
        &self.store
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Open a dispute for an item with its initial competing claimants.
    /// Trust scores are snapshotted here, once per claimant.
    pub async fn create_dispute(
        &self,
        item: ItemSnapshot,
        dispute_type: DisputeType,
        dispute_reason: String,
        initiated_by: String,
        claimants: Vec<NewClaimant>,
    ) -> Result<DisputeView, ServiceError> {
        let mut registered = Vec::with_capacity(claimants.len());
        for claimant in claimants {
            let score = self.fetch_trust_score(&claimant.id).await;
            registered.push(Claimant::new(
                claimant.id,
                claimant.display_name,
                claimant.enterprise,
                claimant.contact_email,
                claimant.claim_description,
                score,
            ));
        }
        let case = DisputeCase::open(
            item,
            dispute_type,
            dispute_reason,
            initiated_by,
            registered,
        )?;
        let view = DisputeView::from(&case);
        tracing::info!(
            dispute_id = %case.id,
            claimants = case.claimants.len(),
            "dispute opened"
        );
        self.store.insert(case);
        Ok(view)
    }

    /// Register a late-joining claimant. Returns the new version.
    pub async fn add_claimant(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        claimant: NewClaimant,
    ) -> Result<u64, ServiceError> {
        // Trust score fetched before the lock is taken.
        let score = self.fetch_trust_score(&claimant.id).await;
        let registered = Claimant::new(
            claimant.id,
            claimant.display_name,
            claimant.enterprise,
            claimant.contact_email,
            claimant.claim_description,
            score,
        );
        let policy = self.escalation_policy();
        self.store.try_update(dispute_id, |case| {
            check_version(case, expected_version)?;
            Ok(case.add_claimant(registered, &policy)?)
        })
    }

    /// Append evidence. Returns the ledger-assigned id and the new version.
    pub async fn submit_evidence(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        submission: EvidenceSubmission,
    ) -> Result<(EvidenceId, u64), ServiceError> {
        let policy = self.escalation_policy();
        self.store.try_update(dispute_id, |case| {
            check_version(case, expected_version)?;
            Ok(case.add_evidence(submission, &policy)?)
        })
    }

    /// Record a verification outcome for an evidence item.
    ///
    /// Serial-number items are checked against the stolen-property registry
    /// first (bounded by the configured timeout, with retries); a positive
    /// match escalates the dispute with police involvement in the same
    /// mutation. See [`VerifyOutcome`] for the degraded paths.
    pub async fn verify_evidence(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        evidence_id: &EvidenceId,
        result: VerificationResult,
    ) -> Result<VerifyOutcome, ServiceError> {
        let snapshot = self
            .store
            .get(dispute_id)
            .ok_or_else(|| ServiceError::NotFound {
                dispute_id: dispute_id.to_string(),
            })?;
        let item = snapshot
            .evidence
            .get(evidence_id)
            .ok_or_else(|| DisputeError::UnknownEvidence {
                evidence_id: evidence_id.to_string(),
            })?;

        let stolen_match = match (&item.evidence_type, &item.serial_number) {
            (EvidenceType::SerialNumber, Some(serial)) => {
                match self.check_stolen(serial).await {
                    Some(check) if check.matched => Some(StolenMatch {
                        reference_id: check.reference_id,
                    }),
                    Some(_) => None,
                    // Timeout or persistent failure: proceed as PENDING.
                    None => {
                        tracing::warn!(
                            dispute_id = %dispute_id,
                            evidence_id = %evidence_id,
                            "stolen-property check unavailable, verification deferred"
                        );
                        return Ok(VerifyOutcome::Deferred);
                    }
                }
            }
            _ => None,
        };

        let policy = self.escalation_policy();
        self.store.try_update(dispute_id, |case| {
            if case.status.is_terminal() {
                // Late check result: audit-only, never re-opens the case.
                tracing::info!(
                    dispute_id = %dispute_id,
                    evidence_id = %evidence_id,
                    status = %case.status,
                    result = %result,
                    stolen_match = stolen_match.is_some(),
                    "verification result recorded for audit only"
                );
                return Ok(VerifyOutcome::AuditOnly {
                    status: case.status,
                });
            }
            check_version(case, expected_version)?;
            let (action, version) =
                case.verify_evidence(evidence_id, result, stolen_match, &policy)?;
            Ok(VerifyOutcome::Applied {
                action,
                status: case.status,
                version,
            })
        })
    }

    /// Seat the verification panel. Returns the new version.
    pub async fn assign_panel(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        nominees: Vec<PanelNominee>,
    ) -> Result<u64, ServiceError> {
        self.store.try_update(dispute_id, |case| {
            check_version(case, expected_version)?;
            Ok(case.assign_panel(nominees)?)
        })
    }

    /// Record a panel member's vote and run the policy and quorum checks.
    /// An identical resubmission leaves status, winner, and version
    /// unchanged.
    pub async fn cast_vote(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        member_id: &PanelMemberId,
        vote: Vote,
        reason: Option<String>,
    ) -> Result<VoteOutcome, ServiceError> {
        let policy = self.escalation_policy();
        let outcome = self.store.try_update(dispute_id, |case| {
            check_version(case, expected_version)?;
            Ok(case.cast_vote(member_id, vote, reason, &policy)?)
        })?;
        if outcome.status.is_terminal() {
            tracing::info!(
                dispute_id = %dispute_id,
                status = %outcome.status,
                version = outcome.version,
                "dispute reached terminal state"
            );
        }
        Ok(outcome)
    }

    /// Investigator override: escalate from any non-terminal state.
    pub async fn force_escalate(
        &self,
        dispute_id: &DisputeId,
        expected_version: u64,
        reason: String,
        police_officer_name: Option<String>,
    ) -> Result<u64, ServiceError> {
        let version = self.store.try_update(dispute_id, |case| {
            check_version(case, expected_version)?;
            Ok(case.force_escalate(reason, police_officer_name)?)
        })?;
        tracing::info!(dispute_id = %dispute_id, version, "dispute escalated by override");
        Ok(version)
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Snapshot view of one dispute.
    pub fn get_dispute_view(&self, dispute_id: &DisputeId) -> Result<DisputeView, ServiceError> {
        self.store
            .get(dispute_id)
            .map(|case| DisputeView::from(&case))
            .ok_or_else(|| ServiceError::NotFound {
                dispute_id: dispute_id.to_string(),
            })
    }

    /// Snapshot views of all disputes matching the filter, oldest first.
    pub fn list_disputes(&self, filter: &DisputeFilter) -> Vec<DisputeView> {
        let mut cases = self.store.filter(|case| filter.matches(case));
        cases.sort_by_key(|case| case.opened_at);
        cases.iter().map(DisputeView::from).collect()
    }

    // ── Collaborator plumbing ──────────────────────────────────────────

    fn escalation_policy(&self) -> EscalationPolicy {
        match self.config.sla_timeout {
            Some(window) => EscalationPolicy::with_sla(window),
            None => EscalationPolicy::disabled(),
        }
    }

    /// Fetch a trust score with retry, falling back to the last-known value
    /// for the identity and then to the neutral midpoint.
    async fn fetch_trust_score(&self, claimant_id: &ClaimantId) -> TrustScore {
        let fetched = tokio::time::timeout(
            self.config.collaborator_timeout,
            retry_with_backoff(
                self.config.max_retries,
                self.config.retry_base_delay,
                "trust-score",
                || self.trust_scores.trust_score(claimant_id),
            ),
        )
        .await;
        match fetched {
            Ok(Ok(score)) => {
                self.last_known_trust
                    .insert(claimant_id.normalized(), score);
                score
            }
            _ => match self.last_known_trust.get(&claimant_id.normalized()) {
                Some(known) => {
                    tracing::warn!(
                        claimant_id = %claimant_id,
                        score = %*known,
                        "trust-score service unavailable, using last-known value"
                    );
                    *known
                }
                None => {
                    tracing::warn!(
                        claimant_id = %claimant_id,
                        "trust-score service unavailable with no last-known value, using neutral"
                    );
                    TrustScore::NEUTRAL
                }
            },
        }
    }

    /// Run the stolen-property check with retry under the configured
    /// timeout. `None` means the check could not complete.
    async fn check_stolen(&self, serial: &str) -> Option<crate::collaborators::SerialCheck> {
        let checked = tokio::time::timeout(
            self.config.collaborator_timeout,
            retry_with_backoff(
                self.config.max_retries,
                self.config.retry_base_delay,
                "stolen-property",
                || self.stolen_registry.check_serial(serial),
            ),
        )
        .await;
        match checked {
            Ok(Ok(check)) => Some(check),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

/// Optimistic concurrency check, run inside the store's write lock.
fn check_version(case: &DisputeCase, expected: u64) -> Result<(), ServiceError> {
    if case.version != expected {
        return Err(ServiceError::VersionConflict {
            dispute_id: case.id.to_string(),
            expected,
            actual: case.version,
            status: case.status.as_str().to_string(),
        });
    }
    Ok(())
}
