use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use auto_loan_core::application::{ApplicationRecord, ApplicationStatus, ReasonDelta};
use auto_loan_core::time_value::level_payment;
use auto_loan_core::types::with_metadata;
use auto_loan_core::underwriting::{
    self, ApplicantInfo, ApplicantUpdate, ReasonSet, UnderwritingInput,
};

use crate::config::PolicySource;
use crate::input;

/// Arguments for evaluating a single application
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Credit score
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Existing monthly debt payments
    #[arg(long)]
    pub monthly_debt: Option<Decimal>,

    /// Gross monthly income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Number of bankruptcies on file
    #[arg(long)]
    pub bankruptcies: Option<u32>,

    /// Number of delinquencies on file
    #[arg(long)]
    pub delinquencies: Option<u32>,

    /// Appraised vehicle value
    #[arg(long)]
    pub vehicle_value: Option<Decimal>,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    #[command(flatten)]
    pub policy: PolicySource,
}

/// Arguments for re-evaluating an updated application
#[derive(Args)]
pub struct ReevaluateArgs {
    /// Path to JSON input file with `applicant`, `update` and optional
    /// `previous_rejections`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub policy: PolicySource,
}

/// Arguments for the level monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual percentage rate as a decimal (0.05 for 5%)
    #[arg(long)]
    pub apr: Decimal,

    /// Term in months
    #[arg(long)]
    pub months: u32,
}

/// A stored application plus the edit being applied to it.
#[derive(Debug, Deserialize)]
struct ReevaluationInput {
    applicant: ApplicantInfo,
    #[serde(default)]
    update: ApplicantUpdate,
    #[serde(default)]
    previous_rejections: ReasonSet,
}

#[derive(Debug, Serialize)]
struct ReevaluationOutput {
    record: ApplicationRecord,
    changes: ReasonDelta,
}

#[derive(Debug, Serialize)]
struct PaymentOutput {
    principal: Decimal,
    apr: Decimal,
    months: u32,
    monthly_payment: Decimal,
    total_paid: Decimal,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let applicant: ApplicantInfo = match input::read_document::<ApplicantInfo>(args.input.as_deref())? {
        Some(applicant) => applicant,
        None => ApplicantInfo {
            credit_score: args.credit_score
                .ok_or("--credit-score is required (or provide --input)")?,
            monthly_debt: args.monthly_debt
                .ok_or("--monthly-debt is required (or provide --input)")?,
            monthly_income: args.monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            bankruptcies: args.bankruptcies
                .ok_or("--bankruptcies is required (or provide --input)")?,
            delinquencies: args.delinquencies
                .ok_or("--delinquencies is required (or provide --input)")?,
            vehicle_value: args.vehicle_value
                .ok_or("--vehicle-value is required (or provide --input)")?,
            loan_amount: args.loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
        },
    };

    let loaded = args.policy.load()?;
    let result = underwriting::underwrite(&UnderwritingInput { applicant }, &loaded.policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_reevaluate(args: ReevaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let data: ReevaluationInput = input::read_document(args.input.as_deref())?
        .ok_or("--input file (or piped JSON) is required for re-evaluation")?;

    let loaded = args.policy.load()?;

    let mut record = ApplicationRecord::pending(data.applicant);
    if !data.previous_rejections.is_empty() {
        record.status = ApplicationStatus::Declined;
        record.rejections = data.previous_rejections;
    }
    let changes = record.apply_update(&data.update, &loaded.policy)?;

    let mut warnings = Vec::new();
    if data.update.is_empty() {
        warnings.push("update is empty; the stored applicant was re-evaluated as is.".to_string());
    }

    let assumptions = serde_json::json!({
        "policy_source": loaded.source,
        "policy_digest": loaded.digest,
        "policy_verified": loaded.verified,
    });

    let output = with_metadata(
        "Re-evaluation with reconciliation of stored rejection reasons",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        loaded.policy.version(),
        ReevaluationOutput { record, changes },
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let monthly_payment = level_payment(args.principal, args.apr, args.months)?;
    let total_paid = monthly_payment
        .checked_mul(Decimal::from(args.months))
        .ok_or("total paid is out of range")?;

    let output = with_metadata(
        "Level monthly payment (annuity, monthly compounding)",
        &serde_json::json!({ "periodic_rate": "apr / 12" }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        None,
        PaymentOutput {
            principal: args.principal,
            apr: args.apr,
            months: args.months,
            monthly_payment,
            total_paid,
        },
    );
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auto_loan_core::types::MAX_SUPPORTED_AMOUNT;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reevaluation_input_defaults() {
        let data: ReevaluationInput = serde_json::from_value(serde_json::json!({
            "applicant": {
                "credit_score": 700, "monthly_debt": 0, "monthly_income": 3000,
                "bankruptcies": 0, "delinquencies": 0, "vehicle_value": 10000,
                "loan_amount": 5000
            }
        }))
        .unwrap();
        assert!(data.update.is_empty());
        assert!(data.previous_rejections.is_empty());
    }

    #[test]
    fn test_payment_command_output() {
        let value = run_payment(PaymentArgs {
            principal: dec!(10000),
            apr: dec!(0.02),
            months: 72,
        })
        .unwrap();
        let payment: Decimal = value["result"]["monthly_payment"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((payment - dec!(147.504)).abs() < dec!(0.001));
    }

    #[test]
    fn test_payment_rejects_zero_months() {
        let err = run_payment(PaymentArgs {
            principal: dec!(10000),
            apr: dec!(0.02),
            months: 0,
        })
        .unwrap_err();
        assert!(err.to_string().contains("months"));
    }

    #[test]
    fn test_payment_rejects_out_of_range_principal() {
        for principal in [Decimal::MAX, dec!(-1)] {
            let err = run_payment(PaymentArgs {
                principal,
                apr: dec!(1),
                months: 1,
            })
            .unwrap_err();
            assert!(err.to_string().contains("principal"));
        }
    }

    #[test]
    fn test_payment_total_at_largest_principal() {
        let value = run_payment(PaymentArgs {
            principal: MAX_SUPPORTED_AMOUNT,
            apr: dec!(1),
            months: 600,
        })
        .unwrap();
        assert!(value["result"]["total_paid"].is_string());
    }

    #[test]
    fn test_reevaluate_rejects_negative_update() {
        let dir = std::env::temp_dir().join(format!("loan-reevaluate-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("input.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "applicant": {
                    "credit_score": 800, "monthly_debt": 0, "monthly_income": 5000,
                    "bankruptcies": 0, "delinquencies": 0, "vehicle_value": 20000,
                    "loan_amount": 10000
                },
                "update": { "loan_amount": -5000 }
            })
            .to_string(),
        )
        .unwrap();

        let err = run_reevaluate(ReevaluateArgs {
            input: Some(path.to_string_lossy().into_owned()),
            policy: PolicySource::default(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("loan_amount"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
