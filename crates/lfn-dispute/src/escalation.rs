//! # Escalation Policy
//!
//! Cross-cutting rule set consulted on every mutating operation. Escalation
//! always wins over a resolution evaluated in the same mutation, so a
//! dispute can never be both resolved and escalated.
//!
//! The SLA window is configuration, not a constant: each deployment decides
//! how long a panel may deliberate before the case goes to a human.

use lfn_core::{EvidenceId, Timestamp};

use crate::resolution::DeadlockReason;

/// Why a dispute escalated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationTrigger {
    /// A serial-number evidence item matched the stolen-property registry.
    /// Escalates immediately with police involvement, regardless of vote
    /// state or the item's VALID/INVALID outcome.
    StolenPropertyMatch {
        /// The matching evidence item.
        evidence_id: EvidenceId,
        /// Registry reference for the match, when supplied.
        reference_id: Option<String>,
    },
    /// Quorum tally deadlocked (unresolved tie or panel exhaustion).
    Deadlock(DeadlockReason),
    /// No quorum within the configured SLA window after panel assignment.
    SlaTimeout,
    /// Explicit investigator override with a free-text reason.
    InvestigatorOverride {
        /// The investigator's stated reason.
        reason: String,
    },
}

impl EscalationTrigger {
    /// Escalation reason string recorded on the dispute.
    pub fn reason(&self) -> String {
        match self {
            EscalationTrigger::StolenPropertyMatch { reference_id, .. } => match reference_id {
                Some(reference) => {
                    format!("stolen-property registry match (reference {reference})")
                }
                None => "stolen-property registry match".to_string(),
            },
            EscalationTrigger::Deadlock(reason) => reason.as_str().to_string(),
            EscalationTrigger::SlaTimeout => "SLA timeout".to_string(),
            EscalationTrigger::InvestigatorOverride { reason } => reason.clone(),
        }
    }

    /// Whether this trigger involves law enforcement by itself.
    pub fn involves_police(&self) -> bool {
        matches!(self, EscalationTrigger::StolenPropertyMatch { .. })
    }
}

/// Configured escalation rules for a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Maximum deliberation window after panel assignment. `None` disables
    /// the SLA trigger.
    pub sla_timeout: Option<chrono::Duration>,
}

impl EscalationPolicy {
    /// Policy with an SLA window.
    pub fn with_sla(sla_timeout: chrono::Duration) -> Self {
        Self {
            sla_timeout: Some(sla_timeout),
        }
    }

    /// Policy without an SLA trigger.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether the SLA window has lapsed since panel assignment.
    pub fn sla_expired(&self, assigned_at: &Timestamp, now: &Timestamp) -> bool {
        match self.sla_timeout {
            Some(window) => now.elapsed_since(assigned_at) > window,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_policy_never_expires() {
        let policy = EscalationPolicy::disabled();
        let assigned = Timestamp::parse("2026-03-01T12:00:00Z").unwrap();
        let later = Timestamp::parse("2036-03-01T12:00:00Z").unwrap();
        assert!(!policy.sla_expired(&assigned, &later));
    }

    #[test]
    fn sla_expires_strictly_after_window() {
        let policy = EscalationPolicy::with_sla(chrono::Duration::hours(48));
        let assigned = Timestamp::parse("2026-03-01T12:00:00Z").unwrap();
        let at_boundary = Timestamp::parse("2026-03-03T12:00:00Z").unwrap();
        let past = Timestamp::parse("2026-03-03T12:00:01Z").unwrap();
        assert!(!policy.sla_expired(&assigned, &at_boundary));
        assert!(policy.sla_expired(&assigned, &past));
    }

    #[test]
    fn trigger_reasons() {
        assert_eq!(
            EscalationTrigger::Deadlock(DeadlockReason::UnresolvedTie).reason(),
            "unresolved tie"
        );
        assert_eq!(
            EscalationTrigger::Deadlock(DeadlockReason::NoQuorumAchievable).reason(),
            "no quorum achievable"
        );
        assert_eq!(EscalationTrigger::SlaTimeout.reason(), "SLA timeout");
    }

    #[test]
    fn stolen_match_involves_police() {
        let trigger = EscalationTrigger::StolenPropertyMatch {
            evidence_id: EvidenceId::new(),
            reference_id: Some("NCIC-77".to_string()),
        };
        assert!(trigger.involves_police());
        assert!(trigger.reason().contains("NCIC-77"));
    }
}
