use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::Policy;

/// Process-wide holder for the active policy.
///
/// Readers take an `Arc` snapshot and evaluate against it; a reload swaps in a
/// whole new policy, so an evaluation already holding a snapshot keeps seeing
/// the one it started with.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<Policy>>,
}

impl PolicyStore {
    pub fn new(policy: Policy) -> Self {
        Self {
            current: RwLock::new(Arc::new(policy)),
        }
    }

    /// Snapshot of the active policy.
    pub fn current(&self) -> Arc<Policy> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a complete policy.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `policy` and return the one it replaced.
    pub fn replace(&self, policy: Policy) -> Arc<Policy> {
        let next = Arc::new(policy);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            from = previous.version().unwrap_or("unversioned"),
            to = guard.version().unwrap_or("unversioned"),
            "underwriting policy replaced"
        );
        previous
    }
}
