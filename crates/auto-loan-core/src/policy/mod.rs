//! Underwriting policy: credit bands, hard-cut limits and loan terms.
//!
//! A [`PolicyConfig`] is the raw, deserialised form. It becomes a [`Policy`]
//! only after [`Policy::new`] has checked every structural rule, and the
//! engine accepts nothing else. Bands are trusted to be in validated order
//! from then on; evaluation never re-sorts them.

mod checksum;
mod store;

pub use checksum::{default_policy, load_policy, policy_digest, DEFAULT_POLICY_DIGEST, DEFAULT_POLICY_JSON};
pub use store::PolicyStore;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::ops::Deref;

use crate::error::UnderwritingError;
use crate::types::Rate;
use crate::UnderwritingResult;

/// Scores at or above this are outside the bureau range.
const CREDIT_SCORE_CEILING: u32 = 1000;
/// No band may price above 30% APR.
const MAX_BAND_APR: Decimal = dec!(0.30);
pub(crate) const MAX_LOAN_LENGTH_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A (minimum score, rate) tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBand {
    /// Inclusive lower bound on the applicant's credit score.
    pub minimum_score_required: u32,
    pub apr: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Highest minimum first; an applicant gets the first band they meet.
    pub credit_bands: Vec<CreditBand>,
    pub maximum_bankruptcies: u32,
    pub maximum_delinquencies: u32,
    /// Total monthly debt (including the new payment when credit-eligible)
    /// over monthly income.
    pub maximum_debt_to_income_ratio: Rate,
    /// Loan amount over vehicle value.
    pub maximum_loan_to_value_ratio: Rate,
    pub loan_length_months: u32,
}

/// A policy that has passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    config: PolicyConfig,
    term: NonZeroU32,
}

impl Policy {
    pub fn new(config: PolicyConfig) -> UnderwritingResult<Self> {
        validate_policy(&config)?;
        let term = NonZeroU32::new(config.loan_length_months).ok_or_else(|| {
            violation("loan_length_range", "loan_length_months must be at least 1".into())
        })?;
        Ok(Self { config, term })
    }

    /// Offered term in months.
    pub fn term(&self) -> NonZeroU32 {
        self.term
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn version(&self) -> Option<&str> {
        self.config.version.as_deref()
    }

    /// First band (highest minimum) the score qualifies for.
    pub fn band_for(&self, credit_score: u32) -> Option<&CreditBand> {
        self.config
            .credit_bands
            .iter()
            .find(|band| band.minimum_score_required <= credit_score)
    }
}

impl Deref for Policy {
    type Target = PolicyConfig;

    fn deref(&self) -> &PolicyConfig {
        &self.config
    }
}

impl TryFrom<PolicyConfig> for Policy {
    type Error = UnderwritingError;

    fn try_from(config: PolicyConfig) -> UnderwritingResult<Self> {
        Policy::new(config)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn violation(rule: &str, detail: String) -> UnderwritingError {
    UnderwritingError::PolicyViolation {
        rule: rule.into(),
        detail,
    }
}

/// Check every structural rule, failing on the first one violated.
pub fn validate_policy(config: &PolicyConfig) -> UnderwritingResult<()> {
    let bands = &config.credit_bands;

    if bands.is_empty() {
        return Err(violation(
            "credit_bands_present",
            "at least one credit band is required".into(),
        ));
    }

    for (i, band) in bands.iter().enumerate() {
        if band.minimum_score_required >= CREDIT_SCORE_CEILING {
            return Err(violation(
                "credit_band_score_range",
                format!(
                    "band {i} requires {} but minimums must be below {CREDIT_SCORE_CEILING}",
                    band.minimum_score_required
                ),
            ));
        }
        if band.apr < Decimal::ZERO || band.apr > MAX_BAND_APR {
            return Err(violation(
                "credit_band_apr_range",
                format!("band {i} apr {} is outside [0, {MAX_BAND_APR}]", band.apr),
            ));
        }
    }

    for (i, pair) in bands.windows(2).enumerate() {
        let (higher, lower) = (&pair[0], &pair[1]);
        if higher.minimum_score_required <= lower.minimum_score_required {
            return Err(violation(
                "credit_bands_descending_by_score",
                format!(
                    "band {} minimum {} must be strictly greater than band {} minimum {}",
                    i,
                    higher.minimum_score_required,
                    i + 1,
                    lower.minimum_score_required
                ),
            ));
        }
        if higher.apr >= lower.apr {
            return Err(violation(
                "credit_bands_ascending_by_apr",
                format!(
                    "band {} apr {} must be strictly less than band {} apr {}",
                    i,
                    higher.apr,
                    i + 1,
                    lower.apr
                ),
            ));
        }
    }

    let dti = config.maximum_debt_to_income_ratio;
    if dti <= Decimal::ZERO || dti > Decimal::ONE {
        return Err(violation(
            "debt_to_income_range",
            format!("maximum_debt_to_income_ratio {dti} is outside (0, 1]"),
        ));
    }

    if config.maximum_loan_to_value_ratio <= Decimal::ZERO {
        return Err(violation(
            "loan_to_value_positive",
            format!(
                "maximum_loan_to_value_ratio {} must be positive",
                config.maximum_loan_to_value_ratio
            ),
        ));
    }

    if config.loan_length_months == 0 || config.loan_length_months > MAX_LOAN_LENGTH_MONTHS {
        return Err(violation(
            "loan_length_range",
            format!(
                "loan_length_months {} is outside [1, {MAX_LOAN_LENGTH_MONTHS}]",
                config.loan_length_months
            ),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
