use std::sync::Arc;

use auto_loan_core::policy::{
    default_policy, load_policy, policy_digest, Policy, PolicyStore, DEFAULT_POLICY_DIGEST,
    DEFAULT_POLICY_JSON,
};
use auto_loan_core::underwriting::{evaluate, ApplicantInfo, RejectionReason};
use auto_loan_core::UnderwritingError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const STRICT_POLICY: &str = r#"{
    "version": "strict-test",
    "credit_bands": [
        { "minimum_score_required": 800, "apr": "0.04" }
    ],
    "maximum_bankruptcies": 0,
    "maximum_delinquencies": 0,
    "maximum_debt_to_income_ratio": "0.35",
    "maximum_loan_to_value_ratio": "0.8",
    "loan_length_months": 36
}"#;

fn applicant() -> ApplicantInfo {
    ApplicantInfo {
        credit_score: 750,
        monthly_debt: dec!(300),
        monthly_income: dec!(5000),
        bankruptcies: 0,
        delinquencies: 1,
        vehicle_value: dec!(20000),
        loan_amount: dec!(15000),
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn test_default_policy_loads_with_checked_in_digest() {
    let policy = default_policy().unwrap();
    assert_eq!(policy_digest(DEFAULT_POLICY_JSON.as_bytes()), DEFAULT_POLICY_DIGEST.trim());
    assert_eq!(policy.version(), Some("2021-06-auto-v1"));
    assert_eq!(policy.term().get(), 72);
}

#[test]
fn test_custom_policy_loads_with_its_own_digest() {
    let digest = policy_digest(STRICT_POLICY.as_bytes());
    let policy = load_policy(STRICT_POLICY.as_bytes(), Some(&digest)).unwrap();
    assert_eq!(policy.credit_bands.len(), 1);
    assert_eq!(policy.maximum_debt_to_income_ratio, dec!(0.35));
    assert_eq!(policy.loan_length_months, 36);
}

#[test]
fn test_default_digest_does_not_vouch_for_other_sources() {
    let err = load_policy(STRICT_POLICY.as_bytes(), Some(DEFAULT_POLICY_DIGEST)).unwrap_err();
    match err {
        UnderwritingError::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, DEFAULT_POLICY_DIGEST.trim());
            assert_eq!(actual, policy_digest(STRICT_POLICY.as_bytes()));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_zero_length_loan_is_rejected() {
    let source = STRICT_POLICY.replace("\"loan_length_months\": 36", "\"loan_length_months\": 0");
    let err = load_policy(source.as_bytes(), None).unwrap_err();
    assert!(matches!(err, UnderwritingError::PolicyViolation { .. }));
}

#[test]
fn test_empty_band_table_is_rejected() {
    let source = STRICT_POLICY.replace(
        r#"{ "minimum_score_required": 800, "apr": "0.04" }"#,
        "",
    );
    let err = load_policy(source.as_bytes(), None).unwrap_err();
    match err {
        UnderwritingError::PolicyViolation { rule, .. } => assert_eq!(rule, "credit_bands_present"),
        other => panic!("unexpected error {other:?}"),
    }
}

// ===========================================================================
// Decisions under a different policy
// ===========================================================================

#[test]
fn test_same_applicant_differs_by_policy() {
    let default = default_policy().unwrap();
    let strict = load_policy(STRICT_POLICY.as_bytes(), None).unwrap();
    let info = applicant();

    let lenient = evaluate(&info, &default);
    assert!(lenient.is_approved());
    assert_eq!(lenient.offer().map(|o| o.apr), Some(dec!(0.05)));

    let declined = evaluate(&info, &strict);
    assert_eq!(
        declined.reasons(),
        &[RejectionReason::ExcessiveDelinquencies, RejectionReason::InsufficientCreditScore]
    );
}

#[test]
fn test_strict_policy_term_drives_offer() {
    let strict = load_policy(STRICT_POLICY.as_bytes(), None).unwrap();
    let mut info = applicant();
    info.credit_score = 820;
    info.delinquencies = 0;
    info.loan_amount = dec!(12000);

    let offer = evaluate(&info, &strict).into_parts().0.expect("approved");
    assert_eq!(offer.term_length_months, 36);
    assert_eq!(offer.apr, dec!(0.04));
    // 12000 at 4% over 36 months
    assert!((offer.monthly_payment - dec!(354.29)).abs() < dec!(0.01));
}

// ===========================================================================
// Store
// ===========================================================================

#[test]
fn test_store_swap_changes_later_decisions_only() {
    let store = PolicyStore::new(default_policy().unwrap());
    let before: Arc<Policy> = store.current();

    let strict = load_policy(STRICT_POLICY.as_bytes(), None).unwrap();
    let previous = store.replace(strict);
    assert_eq!(previous.version(), Some("2021-06-auto-v1"));

    let info = applicant();
    assert!(evaluate(&info, &before).is_approved());
    assert!(!evaluate(&info, &store.current()).is_approved());
    assert_eq!(store.current().version(), Some("strict-test"));
}
