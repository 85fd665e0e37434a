//! # Dispute Store
//!
//! Thread-safe in-memory store of dispute aggregates keyed by
//! [`DisputeId`], the single-writer-per-aggregate boundary of the engine.
//!
//! ## Concurrency
//!
//! Every mutation runs inside [`DisputeStore::try_update`]: one write lock
//! covers read, precondition validation (including the optimistic version
//! check), and mutation, so there is no TOCTOU window between them. Reads
//! clone a snapshot under the read lock — a reader never observes a
//! half-applied mutation. The lock is never held across an `.await`;
//! collaborator calls complete before the closure runs.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use lfn_core::DisputeId;
use lfn_dispute::DisputeCase;

use crate::error::ServiceError;

/// Shared in-memory store of dispute aggregates.
#[derive(Debug, Clone, Default)]
pub struct DisputeStore {
    data: Arc<RwLock<HashMap<DisputeId, DisputeCase>>>,
}

impl DisputeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly opened dispute.
    pub fn insert(&self, case: DisputeCase) {
        self.data.write().insert(case.id.clone(), case);
    }

    /// Snapshot a dispute by id.
    pub fn get(&self, id: &DisputeId) -> Option<DisputeCase> {
        self.data.read().get(id).cloned()
    }

    /// Atomically read-validate-update a dispute.
    ///
    /// The closure receives `&mut DisputeCase` and may validate
    /// preconditions (version, status) and mutate under the same write
    /// lock.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the id is absent, otherwise the
    /// closure's result.
    pub fn try_update<R>(
        &self,
        id: &DisputeId,
        f: impl FnOnce(&mut DisputeCase) -> Result<R, ServiceError>,
    ) -> Result<R, ServiceError> {
        let mut guard = self.data.write();
        match guard.get_mut(id) {
            Some(case) => f(case),
            None => Err(ServiceError::NotFound {
                dispute_id: id.to_string(),
            }),
        }
    }

    /// Snapshot all disputes matching a predicate.
    pub fn filter(&self, predicate: impl Fn(&DisputeCase) -> bool) -> Vec<DisputeCase> {
        self.data
            .read()
            .values()
            .filter(|case| predicate(case))
            .cloned()
            .collect()
    }

    /// Whether a dispute exists.
    pub fn contains(&self, id: &DisputeId) -> bool {
        self.data.read().contains_key(id)
    }

    /// Number of stored disputes.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfn_core::{ClaimantId, TrustScore};
    use lfn_dispute::{Claimant, DisputeType, ItemSnapshot};

    fn open_case() -> DisputeCase {
        let claimant = |id: &str| {
            Claimant::new(
                ClaimantId::new(id).unwrap(),
                format!("User {id}"),
                "University",
                None,
                "mine",
                TrustScore::NEUTRAL,
            )
        };
        DisputeCase::open(
            ItemSnapshot {
                item_id: "item-1".to_string(),
                title: "Backpack".to_string(),
                description: "blue".to_string(),
                category: "bags".to_string(),
                estimated_value: None,
                location: "Station".to_string(),
                holding_enterprise_id: "ent-1".to_string(),
                holding_enterprise_name: "Transit".to_string(),
            },
            DisputeType::OwnershipConflict,
            "reason",
            "investigator",
            vec![claimant("u-1"), claimant("u-2")],
        )
        .unwrap()
    }

    #[test]
    fn insert_and_get_clone_snapshot() {
        let store = DisputeStore::new();
        let case = open_case();
        let id = case.id.clone();
        store.insert(case.clone());
        let snapshot = store.get(&id).unwrap();
        assert_eq!(snapshot, case);
    }

    #[test]
    fn try_update_missing_id_is_not_found() {
        let store = DisputeStore::new();
        let result = store.try_update(&DisputeId::new(), |_| Ok(()));
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn try_update_mutates_in_place() {
        let store = DisputeStore::new();
        let case = open_case();
        let id = case.id.clone();
        store.insert(case);
        let version = store
            .try_update(&id, |case| {
                case.force_escalate("test", None).map_err(ServiceError::from)
            })
            .unwrap();
        assert_eq!(version, 2);
        assert!(store.get(&id).unwrap().status.is_terminal());
    }

    #[test]
    fn filter_clones_matching_cases() {
        let store = DisputeStore::new();
        store.insert(open_case());
        store.insert(open_case());
        assert_eq!(store.filter(|_| true).len(), 2);
        assert_eq!(store.filter(|c| c.status.is_terminal()).len(), 0);
    }
}
