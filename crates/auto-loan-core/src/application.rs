//! Stored application state and how a fresh decision is folded into it.
//!
//! The engine knows nothing about earlier decisions. When an application is
//! edited and re-evaluated, the stored rejections are reconciled against the
//! new ones here: reasons present in both are kept where they were, reasons
//! that no longer apply are removed, and new ones are appended.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policy::Policy;
use crate::underwriting::{
    evaluate, validate_applicant, ApplicantInfo, ApplicantUpdate, Decision, Offer, ReasonSet,
};
use crate::UnderwritingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Approved,
    Declined,
    Pending,
}

impl ApplicationStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::Approved => 1,
            Self::Declined => 2,
            Self::Pending => 3,
        }
    }
}

/// Changes needed to turn a stored reason set into a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonDelta {
    /// In both sets.
    pub retained: ReasonSet,
    /// Only in the new set.
    pub to_add: ReasonSet,
    /// Only in the stored set.
    pub to_remove: ReasonSet,
}

impl ReasonDelta {
    pub fn between(existing: &ReasonSet, updated: &ReasonSet) -> Self {
        Self {
            retained: existing.intersection(updated),
            to_add: updated.difference(existing),
            to_remove: existing.difference(updated),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply to `existing` in place, keeping retained reasons in their stored
    /// position.
    pub fn apply(&self, existing: &mut ReasonSet) {
        for reason in &self.to_remove {
            existing.remove(reason);
        }
        existing.extend(self.to_add.iter());
    }
}

/// An application as a result consumer would persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub applicant: ApplicantInfo,
    pub status: ApplicationStatus,
    pub offer: Option<Offer>,
    pub rejections: ReasonSet,
}

impl ApplicationRecord {
    /// A record that has not been evaluated yet.
    pub fn pending(applicant: ApplicantInfo) -> Self {
        Self {
            applicant,
            status: ApplicationStatus::Pending,
            offer: None,
            rejections: ReasonSet::new(),
        }
    }

    /// Validate and evaluate a new application and record the decision.
    pub fn submit(applicant: ApplicantInfo, policy: &Policy) -> UnderwritingResult<Self> {
        validate_applicant(&applicant)?;
        let mut record = Self::pending(applicant);
        record.record_decision(evaluate(&record.applicant, policy));
        Ok(record)
    }

    /// Merge a partial update, re-evaluate, and reconcile the stored outcome.
    ///
    /// The merged applicant is validated first; on error the record is left
    /// exactly as it was.
    pub fn apply_update(
        &mut self,
        update: &ApplicantUpdate,
        policy: &Policy,
    ) -> UnderwritingResult<ReasonDelta> {
        let mut merged = self.applicant.clone();
        update.apply_to(&mut merged);
        validate_applicant(&merged)?;

        let decision = evaluate(&merged, policy);
        self.applicant = merged;
        Ok(self.record_decision(decision))
    }

    /// Fold a decision into the record and report how the rejections changed.
    pub fn record_decision(&mut self, decision: Decision) -> ReasonDelta {
        let (offer, updated) = decision.into_parts();
        let delta = ReasonDelta::between(&self.rejections, &updated);

        match offer {
            Some(offer) => {
                self.status = ApplicationStatus::Approved;
                self.offer = Some(offer);
                self.rejections = ReasonSet::new();
            }
            None => {
                self.status = ApplicationStatus::Declined;
                self.offer = None;
                delta.apply(&mut self.rejections);
            }
        }

        debug!(
            status = ?self.status,
            added = delta.to_add.len(),
            removed = delta.to_remove.len(),
            "application decision recorded"
        );

        delta
    }
}
