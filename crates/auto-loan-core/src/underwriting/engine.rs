use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::applicant::ApplicantInfo;
use super::reasons::{ReasonSet, RejectionReason};
use crate::policy::Policy;
use crate::time_value::amortizing_payment;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Loan terms offered on full approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub apr: Rate,
    pub monthly_payment: Money,
    pub term_length_months: u32,
}

/// Outcome of one evaluation. An approval never carries reasons and a decline
/// always carries at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved { offer: Offer },
    Declined { reasons: ReasonSet },
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved { .. })
    }

    pub fn offer(&self) -> Option<&Offer> {
        match self {
            Decision::Approved { offer } => Some(offer),
            Decision::Declined { .. } => None,
        }
    }

    /// Empty for approvals.
    pub fn reasons(&self) -> &[RejectionReason] {
        match self {
            Decision::Approved { .. } => &[],
            Decision::Declined { reasons } => reasons.as_slice(),
        }
    }

    /// The `(offer | none, reasons)` pair view.
    pub fn into_parts(self) -> (Option<Offer>, ReasonSet) {
        match self {
            Decision::Approved { offer } => (Some(offer), ReasonSet::new()),
            Decision::Declined { reasons } => (None, reasons),
        }
    }
}

/// Which debt figure the debt-to-income check measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtToIncomeBasis {
    /// Existing debt only; used when no credit band matched.
    PreLoan,
    /// Existing debt plus the new loan's monthly payment.
    PostLoan,
}

/// Ratios computed during evaluation. `None` means the divisor was zero (or
/// the quotient was out of range) and the ratio is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioDiagnostics {
    pub loan_to_value: Option<Rate>,
    pub debt_to_income: Option<Rate>,
    pub debt_to_income_basis: DebtToIncomeBasis,
}

/// Decision plus the figures that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub decision: Decision,
    pub ratios: RatioDiagnostics,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate an application against the policy.
///
/// Pure and infallible: every decline is expressed through the returned
/// reasons, including amounts too large to price. Reasons appear in rule order (bankruptcies, delinquencies, credit
/// score, loan-to-value, debt-to-income).
pub fn evaluate(applicant: &ApplicantInfo, policy: &Policy) -> Decision {
    assess(applicant, policy).decision
}

/// [`evaluate`], keeping the computed ratios alongside the decision.
pub fn assess(applicant: &ApplicantInfo, policy: &Policy) -> Assessment {
    let mut reasons = ReasonSet::new();

    if applicant.bankruptcies > policy.maximum_bankruptcies {
        reasons.insert(RejectionReason::ExcessiveBankruptcies);
    }

    if applicant.delinquencies > policy.maximum_delinquencies {
        reasons.insert(RejectionReason::ExcessiveDelinquencies);
    }

    let eligible_rate = policy.band_for(applicant.credit_score).map(|band| band.apr);
    if eligible_rate.is_none() {
        reasons.insert(RejectionReason::InsufficientCreditScore);
    }

    // Zero collateral is always over the limit, whatever the loan amount.
    let loan_to_value = checked_ratio(applicant.loan_amount, applicant.vehicle_value);
    if exceeds(loan_to_value, policy.maximum_loan_to_value_ratio) {
        reasons.insert(RejectionReason::ExcessiveLoanToValueRatio);
    }

    // An applicant already out of every band is judged on existing debt; the
    // new payment only counts when there is a rate to price it at.
    let (payment, debt_to_income, debt_to_income_basis) = match eligible_rate {
        None => (
            None,
            debt_ratio(applicant.monthly_debt, applicant.monthly_income),
            DebtToIncomeBasis::PreLoan,
        ),
        Some(apr) => {
            // Overflow in the payment or the debt sum leaves the ratio unbounded.
            let payment = amortizing_payment(applicant.loan_amount, apr, policy.term());
            let debt_to_income = payment
                .and_then(|p| p.checked_add(applicant.monthly_debt))
                .and_then(|debt| debt_ratio(debt, applicant.monthly_income));
            (payment, debt_to_income, DebtToIncomeBasis::PostLoan)
        }
    };
    if exceeds(debt_to_income, policy.maximum_debt_to_income_ratio) {
        reasons.insert(RejectionReason::ExcessiveDebtToIncomeRatio);
    }

    let decision = match (eligible_rate, payment) {
        (Some(apr), Some(monthly_payment)) if reasons.is_empty() => Decision::Approved {
            offer: Offer {
                apr,
                monthly_payment,
                term_length_months: policy.loan_length_months,
            },
        },
        _ => Decision::Declined { reasons },
    };

    Assessment {
        decision,
        ratios: RatioDiagnostics {
            loan_to_value,
            debt_to_income,
            debt_to_income_basis,
        },
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `numerator / denominator`, or `None` when the divisor is zero or the
/// quotient overflows.
fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Rate> {
    numerator.checked_div(denominator)
}

/// Debt over income, where no debt is a ratio of zero even on zero income.
fn debt_ratio(debt: Money, income: Money) -> Option<Rate> {
    if debt.is_zero() {
        return Some(Decimal::ZERO);
    }
    checked_ratio(debt, income)
}

/// Strictly greater than the limit disqualifies; an unbounded ratio always does.
fn exceeds(ratio: Option<Rate>, limit: Rate) -> bool {
    ratio.map_or(true, |r| r > limit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
