use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnderwritingError;

// ---------------------------------------------------------------------------
// RejectionReason
// ---------------------------------------------------------------------------

/// Why an application was declined. Closed set; the serialised name and the
/// integer code are both stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    ExcessiveBankruptcies,
    ExcessiveDelinquencies,
    ExcessiveDebtToIncomeRatio,
    ExcessiveLoanToValueRatio,
    InsufficientCreditScore,
}

impl RejectionReason {
    pub const ALL: [Self; 5] = [
        Self::ExcessiveBankruptcies,
        Self::ExcessiveDelinquencies,
        Self::ExcessiveDebtToIncomeRatio,
        Self::ExcessiveLoanToValueRatio,
        Self::InsufficientCreditScore,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Self::ExcessiveBankruptcies => 1,
            Self::ExcessiveDelinquencies => 2,
            Self::ExcessiveDebtToIncomeRatio => 3,
            Self::ExcessiveLoanToValueRatio => 4,
            Self::InsufficientCreditScore => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcessiveBankruptcies => "EXCESSIVE_BANKRUPTCIES",
            Self::ExcessiveDelinquencies => "EXCESSIVE_DELINQUENCIES",
            Self::ExcessiveDebtToIncomeRatio => "EXCESSIVE_DEBT_TO_INCOME_RATIO",
            Self::ExcessiveLoanToValueRatio => "EXCESSIVE_LOAN_TO_VALUE_RATIO",
            Self::InsufficientCreditScore => "INSUFFICIENT_CREDIT_SCORE",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ExcessiveBankruptcies => "More bankruptcies on file than the policy allows",
            Self::ExcessiveDelinquencies => "More delinquencies on file than the policy allows",
            Self::ExcessiveDebtToIncomeRatio => "Monthly debt is too high relative to monthly income",
            Self::ExcessiveLoanToValueRatio => "Requested amount is too high relative to the vehicle value",
            Self::InsufficientCreditScore => "Credit score is below every credit band",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectionReason {
    type Err = UnderwritingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnderwritingError::InvalidInput {
                field: "reason".into(),
                reason: format!("unknown rejection reason '{s}'"),
            })
    }
}

impl TryFrom<u8> for RejectionReason {
    type Error = UnderwritingError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.code() == code)
            .ok_or_else(|| UnderwritingError::InvalidInput {
                field: "reason".into(),
                reason: format!("unknown rejection reason code {code}"),
            })
    }
}

// ---------------------------------------------------------------------------
// ReasonSet
// ---------------------------------------------------------------------------

/// Insertion-ordered set of rejection reasons.
///
/// Order is the order reasons were first inserted; set operations keep the
/// order of the left-hand operand and append anything new from the right.
/// Equality is set equality and ignores order; compare [`ReasonSet::as_slice`]
/// when order matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<RejectionReason>", into = "Vec<RejectionReason>")]
pub struct ReasonSet {
    reasons: Vec<RejectionReason>,
}

impl ReasonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the reason was already present.
    pub fn insert(&mut self, reason: RejectionReason) -> bool {
        if self.contains(reason) {
            return false;
        }
        self.reasons.push(reason);
        true
    }

    pub fn remove(&mut self, reason: RejectionReason) -> bool {
        let before = self.reasons.len();
        self.reasons.retain(|r| *r != reason);
        self.reasons.len() != before
    }

    pub fn contains(&self, reason: RejectionReason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RejectionReason> + '_ {
        self.reasons.iter().copied()
    }

    pub fn as_slice(&self) -> &[RejectionReason] {
        &self.reasons
    }

    pub fn union(&self, other: &ReasonSet) -> ReasonSet {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }

    pub fn intersection(&self, other: &ReasonSet) -> ReasonSet {
        self.iter().filter(|r| other.contains(*r)).collect()
    }

    pub fn difference(&self, other: &ReasonSet) -> ReasonSet {
        self.iter().filter(|r| !other.contains(*r)).collect()
    }
}

impl PartialEq for ReasonSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|r| other.contains(r))
    }
}

impl Eq for ReasonSet {}

impl Extend<RejectionReason> for ReasonSet {
    fn extend<I: IntoIterator<Item = RejectionReason>>(&mut self, iter: I) {
        for reason in iter {
            self.insert(reason);
        }
    }
}

impl FromIterator<RejectionReason> for ReasonSet {
    fn from_iter<I: IntoIterator<Item = RejectionReason>>(iter: I) -> Self {
        let mut set = ReasonSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<RejectionReason>> for ReasonSet {
    fn from(reasons: Vec<RejectionReason>) -> Self {
        reasons.into_iter().collect()
    }
}

impl From<ReasonSet> for Vec<RejectionReason> {
    fn from(set: ReasonSet) -> Self {
        set.reasons
    }
}

impl<'a> IntoIterator for &'a ReasonSet {
    type Item = RejectionReason;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, RejectionReason>>;

    fn into_iter(self) -> Self::IntoIter {
        self.reasons.iter().copied()
    }
}
