//! Auto-loan underwriting.
//!
//! [`evaluate`] is the decision itself: hard cuts on bankruptcies and
//! delinquencies, a credit band lookup, loan-to-value, then debt-to-income
//! measured before or after the new payment depending on whether a band
//! matched. [`underwrite`] is the caller-facing wrapper that validates the
//! applicant first and returns the decision inside a computation envelope
//! with the ratios that drove it.

mod applicant;
mod engine;
mod reasons;

pub use applicant::{validate_applicant, ApplicantInfo, ApplicantUpdate};
pub use engine::{assess, evaluate, Assessment, DebtToIncomeBasis, Decision, Offer, RatioDiagnostics};
pub use reasons::{ReasonSet, RejectionReason};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::policy::Policy;
use crate::types::{with_metadata, ComputationOutput};
use crate::UnderwritingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderwritingInput {
    pub applicant: ApplicantInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnderwritingOutput {
    pub decision: Decision,
    pub ratios: RatioDiagnostics,
}

/// Validate the applicant, evaluate it, and wrap the outcome with the policy
/// assumptions it was made under.
pub fn underwrite(
    input: &UnderwritingInput,
    policy: &Policy,
) -> UnderwritingResult<ComputationOutput<UnderwritingOutput>> {
    let start = Instant::now();
    let applicant = &input.applicant;
    let mut warnings: Vec<String> = Vec::new();

    validate_applicant(applicant)?;

    if applicant.monthly_income.is_zero() {
        warnings.push(
            "monthly_income is zero; any monthly debt makes the debt-to-income ratio unbounded."
                .into(),
        );
    }
    if applicant.vehicle_value.is_zero() {
        warnings.push(
            "vehicle_value is zero; loan-to-value is treated as exceeding the policy maximum."
                .into(),
        );
    }

    let Assessment { decision, ratios } = assess(applicant, policy);

    debug!(
        approved = decision.is_approved(),
        reasons = ?decision.reasons(),
        loan_to_value = ?ratios.loan_to_value,
        debt_to_income = ?ratios.debt_to_income,
        "application evaluated"
    );

    let output = UnderwritingOutput { decision, ratios };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "policy_version": policy.version(),
        "credit_band_count": policy.credit_bands.len(),
        "maximum_bankruptcies": policy.maximum_bankruptcies,
        "maximum_delinquencies": policy.maximum_delinquencies,
        "maximum_debt_to_income_ratio": policy.maximum_debt_to_income_ratio,
        "maximum_loan_to_value_ratio": policy.maximum_loan_to_value_ratio,
        "loan_length_months": policy.loan_length_months,
    });

    Ok(with_metadata(
        "Auto-loan underwriting (hard cuts, credit band, LTV, DTI)",
        &assumptions,
        warnings,
        elapsed,
        policy.version(),
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::default_policy;
    use crate::UnderwritingError;
    use rust_decimal_macros::dec;

    fn input(monthly_income: rust_decimal::Decimal) -> UnderwritingInput {
        UnderwritingInput {
            applicant: ApplicantInfo {
                credit_score: 750,
                monthly_debt: dec!(200),
                monthly_income,
                bankruptcies: 0,
                delinquencies: 0,
                vehicle_value: dec!(20000),
                loan_amount: dec!(15000),
            },
        }
    }

    #[test]
    fn test_envelope_carries_policy_metadata() {
        let policy = default_policy().unwrap();
        let out = underwrite(&input(dec!(5000)), &policy).unwrap();
        assert!(out.result.decision.is_approved());
        assert_eq!(out.metadata.policy_version.as_deref(), policy.version());
        assert_eq!(out.assumptions["loan_length_months"], 72);
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.ratios.loan_to_value, Some(dec!(0.75)));
        assert_eq!(out.result.ratios.debt_to_income_basis, DebtToIncomeBasis::PostLoan);
    }

    #[test]
    fn test_zero_income_warns_and_declines() {
        let policy = default_policy().unwrap();
        let out = underwrite(&input(dec!(0)), &policy).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(
            out.result.decision.reasons(),
            &[RejectionReason::ExcessiveDebtToIncomeRatio]
        );
    }

    #[test]
    fn test_invalid_applicant_is_an_error_not_a_decline() {
        let policy = default_policy().unwrap();
        let mut bad = input(dec!(5000));
        bad.applicant.loan_amount = dec!(-5);
        let err = underwrite(&bad, &policy).unwrap_err();
        assert!(matches!(err, UnderwritingError::InvalidInput { .. }));
    }
}
