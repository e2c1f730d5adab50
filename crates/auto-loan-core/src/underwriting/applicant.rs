use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UnderwritingError;
use crate::types::{Money, MAX_SUPPORTED_AMOUNT};
use crate::UnderwritingResult;

/// Applicant-supplied attributes for a loan application. Every field is
/// required; deserialisation fails on a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantInfo {
    pub credit_score: u32,
    pub monthly_debt: Money,
    pub monthly_income: Money,
    pub bankruptcies: u32,
    pub delinquencies: u32,
    pub vehicle_value: Money,
    pub loan_amount: Money,
}

/// Partial change to a stored application. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_debt: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bankruptcies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delinquencies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_value: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Money>,
}

impl ApplicantUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, applicant: &mut ApplicantInfo) {
        if let Some(v) = self.credit_score {
            applicant.credit_score = v;
        }
        if let Some(v) = self.monthly_debt {
            applicant.monthly_debt = v;
        }
        if let Some(v) = self.monthly_income {
            applicant.monthly_income = v;
        }
        if let Some(v) = self.bankruptcies {
            applicant.bankruptcies = v;
        }
        if let Some(v) = self.delinquencies {
            applicant.delinquencies = v;
        }
        if let Some(v) = self.vehicle_value {
            applicant.vehicle_value = v;
        }
        if let Some(v) = self.loan_amount {
            applicant.loan_amount = v;
        }
    }
}

/// Reject money amounts the engine cannot interpret: negatives, and values
/// beyond a trillion. Counts and scores are unsigned and need no check.
pub fn validate_applicant(applicant: &ApplicantInfo) -> UnderwritingResult<()> {
    let amounts = [
        ("monthly_debt", applicant.monthly_debt),
        ("monthly_income", applicant.monthly_income),
        ("vehicle_value", applicant.vehicle_value),
        ("loan_amount", applicant.loan_amount),
    ];

    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(UnderwritingError::InvalidInput {
                field: field.into(),
                reason: format!("must be non-negative, got {value}"),
            });
        }
        if value > MAX_SUPPORTED_AMOUNT {
            return Err(UnderwritingError::InvalidInput {
                field: field.into(),
                reason: format!("{value} exceeds the supported maximum of {MAX_SUPPORTED_AMOUNT}"),
            });
        }
    }

    Ok(())
}
