use sha2::{Digest, Sha256};
use tracing::info;

use super::{Policy, PolicyConfig};
use crate::error::UnderwritingError;
use crate::UnderwritingResult;

/// The checked-in policy. Edits require sign-off from the policy owner and a
/// matching update to [`DEFAULT_POLICY_DIGEST`].
pub const DEFAULT_POLICY_JSON: &str = include_str!("../../policy/default_policy.json");

/// SHA-256 of [`DEFAULT_POLICY_JSON`], hex encoded.
pub const DEFAULT_POLICY_DIGEST: &str = include_str!("../../policy/default_policy.sha256");

/// Lowercase hex SHA-256 of a policy source.
pub fn policy_digest(source: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source);
    hex::encode(hasher.finalize())
}

/// Parse and validate a policy source, refusing it when `expected_digest` is
/// given and does not match.
pub fn load_policy(source: &[u8], expected_digest: Option<&str>) -> UnderwritingResult<Policy> {
    let actual = policy_digest(source);

    if let Some(expected) = expected_digest {
        let expected = expected.trim().to_ascii_lowercase();
        if expected != actual {
            return Err(UnderwritingError::ChecksumMismatch { expected, actual });
        }
    }

    let config: PolicyConfig = serde_json::from_slice(source)?;
    let policy = Policy::new(config)?;

    info!(
        version = policy.version().unwrap_or("unversioned"),
        digest = %actual,
        bands = policy.credit_bands.len(),
        verified = expected_digest.is_some(),
        "underwriting policy loaded"
    );

    Ok(policy)
}

/// The checked-in policy, verified against its checked-in digest.
pub fn default_policy() -> UnderwritingResult<Policy> {
    load_policy(DEFAULT_POLICY_JSON.as_bytes(), Some(DEFAULT_POLICY_DIGEST))
}
