//! Property-based tests for the underwriting engine.
//!
//! These tests use proptest to verify invariants around:
//! - Approval and decline being mutually exclusive
//! - Reason ordering and uniqueness
//! - Behaviour as the credit score rises
//! - Reconciliation of stored rejections

use crate::application::ReasonDelta;
use crate::policy::{default_policy, Policy};
use crate::underwriting::{evaluate, ApplicantInfo, ReasonSet, RejectionReason};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Strategies
// ============================================================================

/// Whole cents up to `max_units`.
fn arb_money(max_units: i64) -> impl Strategy<Value = Decimal> {
    (0i64..=max_units * 100).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_applicant() -> impl Strategy<Value = ApplicantInfo> {
    (
        0u32..1000,
        arb_money(20_000),
        arb_money(50_000),
        0u32..4,
        0u32..4,
        arb_money(100_000),
        arb_money(100_000),
    )
        .prop_map(
            |(credit_score, monthly_debt, monthly_income, bankruptcies, delinquencies, vehicle_value, loan_amount)| {
                ApplicantInfo {
                    credit_score,
                    monthly_debt,
                    monthly_income,
                    bankruptcies,
                    delinquencies,
                    vehicle_value,
                    loan_amount,
                }
            },
        )
}

fn arb_reason_set() -> impl Strategy<Value = ReasonSet> {
    prop::collection::vec(prop::sample::select(RejectionReason::ALL.to_vec()), 0..8)
        .prop_map(ReasonSet::from)
}

fn policy() -> Policy {
    default_policy().expect("checked-in policy loads")
}

/// Position of each reason in evaluation order.
fn rule_position(reason: RejectionReason) -> usize {
    match reason {
        RejectionReason::ExcessiveBankruptcies => 0,
        RejectionReason::ExcessiveDelinquencies => 1,
        RejectionReason::InsufficientCreditScore => 2,
        RejectionReason::ExcessiveLoanToValueRatio => 3,
        RejectionReason::ExcessiveDebtToIncomeRatio => 4,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn offer_present_iff_no_reasons(applicant in arb_applicant()) {
        let decision = evaluate(&applicant, &policy());
        prop_assert_eq!(decision.offer().is_some(), decision.reasons().is_empty());
        prop_assert_eq!(decision.is_approved(), decision.offer().is_some());
    }

    #[test]
    fn reasons_are_unique_and_in_rule_order(applicant in arb_applicant()) {
        let decision = evaluate(&applicant, &policy());
        let positions: Vec<usize> = decision.reasons().iter().map(|r| rule_position(*r)).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "reasons {:?}", decision.reasons());
    }

    #[test]
    fn evaluation_is_deterministic(applicant in arb_applicant()) {
        let policy = policy();
        let first = evaluate(&applicant, &policy);
        let second = evaluate(&applicant, &policy);
        // ReasonSet equality ignores order, so compare the slices.
        prop_assert_eq!(first.reasons(), second.reasons());
        prop_assert_eq!(first.offer(), second.offer());
    }

    #[test]
    fn hard_cuts_follow_counts_alone(applicant in arb_applicant()) {
        let policy = policy();
        let reasons = evaluate(&applicant, &policy).reasons().to_vec();
        prop_assert_eq!(
            reasons.contains(&RejectionReason::ExcessiveBankruptcies),
            applicant.bankruptcies > policy.maximum_bankruptcies
        );
        prop_assert_eq!(
            reasons.contains(&RejectionReason::ExcessiveDelinquencies),
            applicant.delinquencies > policy.maximum_delinquencies
        );
    }

    #[test]
    fn credit_reason_iff_no_band(applicant in arb_applicant()) {
        let policy = policy();
        let decision = evaluate(&applicant, &policy);
        prop_assert_eq!(
            decision.reasons().contains(&RejectionReason::InsufficientCreditScore),
            policy.band_for(applicant.credit_score).is_none()
        );
    }

    #[test]
    fn approval_survives_a_higher_score(applicant in arb_applicant(), bump in 0u32..500) {
        let policy = policy();
        let base = evaluate(&applicant, &policy);
        if let Some(offer) = base.offer() {
            let mut better = applicant.clone();
            better.credit_score += bump;
            let improved = evaluate(&better, &policy);
            let improved_offer = improved.offer();
            prop_assert!(improved_offer.is_some(), "declined at higher score: {:?}", improved.reasons());
            prop_assert!(improved_offer.map_or(false, |o| o.apr <= offer.apr));
        }
    }

    #[test]
    fn offered_rate_is_first_qualifying_band(applicant in arb_applicant()) {
        let policy = policy();
        if let Some(offer) = evaluate(&applicant, &policy).offer() {
            let first = policy
                .credit_bands
                .iter()
                .find(|band| applicant.credit_score >= band.minimum_score_required)
                .map(|band| band.apr);
            prop_assert_eq!(Some(offer.apr), first);
            prop_assert_eq!(offer.term_length_months, policy.loan_length_months);
        }
    }

    #[test]
    fn delta_reconciles_to_the_new_set(existing in arb_reason_set(), updated in arb_reason_set()) {
        let delta = ReasonDelta::between(&existing, &updated);
        let mut stored = existing.clone();
        delta.apply(&mut stored);
        prop_assert_eq!(&stored, &updated);
        prop_assert!(delta.to_add.intersection(&delta.to_remove).is_empty());
        prop_assert_eq!(delta.retained.len() + delta.to_remove.len(), existing.len());
    }
}
