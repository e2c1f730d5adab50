use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Monetary amounts (income, debt, loan principal, collateral value).
pub type Money = Decimal;

/// Rates and ratios expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Largest money amount accepted from callers. Larger values are treated as
/// data-entry errors.
pub const MAX_SUPPORTED_AMOUNT: Money = dec!(1_000_000_000_000);

/// Envelope returned by every caller-facing computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    /// Label of the underwriting policy the result was computed under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a result with methodology, assumptions and timing.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    policy_version: Option<&str>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            policy_version: policy_version.map(str::to_string),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
