use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::UnderwritingError;
use crate::policy::MAX_LOAN_LENGTH_MONTHS;
use crate::types::{Money, Rate, MAX_SUPPORTED_AMOUNT};
use crate::UnderwritingResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Highest annual rate [`level_payment`] accepts.
const MAX_ANNUAL_RATE: Decimal = dec!(1);

/// Payment (PMT) per period for a loan of `present_value` over `nper` periods.
///
/// Uses the spreadsheet sign convention: borrowing a positive amount yields a
/// negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> UnderwritingResult<Money> {
    if nper == 0 {
        return Err(UnderwritingError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| UnderwritingError::InvalidInput {
            field: "rate".into(),
            reason: format!("(1 + {rate})^{nper} is out of range"),
        })?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(UnderwritingError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Fully-amortizing monthly payment for `principal` at `annual_rate` over
/// `months`, returned as a positive amount.
pub fn level_payment(principal: Money, annual_rate: Rate, months: u32) -> UnderwritingResult<Money> {
    let months = NonZeroU32::new(months).ok_or_else(|| UnderwritingError::InvalidInput {
        field: "months".into(),
        reason: "Loan term must be at least one month".into(),
    })?;
    if months.get() > MAX_LOAN_LENGTH_MONTHS {
        return Err(UnderwritingError::InvalidInput {
            field: "months".into(),
            reason: format!("Loan term must not exceed {MAX_LOAN_LENGTH_MONTHS} months"),
        });
    }
    if annual_rate < Decimal::ZERO || annual_rate > MAX_ANNUAL_RATE {
        return Err(UnderwritingError::InvalidInput {
            field: "annual_rate".into(),
            reason: format!("{annual_rate} is outside [0, {MAX_ANNUAL_RATE}]"),
        });
    }
    if principal < Decimal::ZERO || principal > MAX_SUPPORTED_AMOUNT {
        return Err(UnderwritingError::InvalidInput {
            field: "principal".into(),
            reason: format!("{principal} is outside [0, {MAX_SUPPORTED_AMOUNT}]"),
        });
    }
    amortizing_payment(principal, annual_rate, months).ok_or_else(|| UnderwritingError::InvalidInput {
        field: "principal".into(),
        reason: "payment is out of range".into(),
    })
}

/// `principal * r / (1 - (1 + r)^-n)` with `r = annual_rate / 12`.
///
/// Falls back to straight-line `principal / n` when the monthly rate is zero
/// or too small to move `(1 + r)^n` at 28 digits of precision. `None` when
/// the payment does not fit in a `Decimal`.
pub(crate) fn amortizing_payment(principal: Money, annual_rate: Rate, months: NonZeroU32) -> Option<Money> {
    let n = months.get();
    let r = annual_rate / MONTHS_PER_YEAR;
    let factor = if r.is_zero() {
        Decimal::ONE
    } else {
        (Decimal::ONE + r).powi(i64::from(n))
    };

    if factor == Decimal::ONE {
        return Some(principal / Decimal::from(n));
    }

    principal.checked_mul(r * factor / (factor - Decimal::ONE))
}
