use std::fs;

use clap::Args;
use tracing::warn;

use auto_loan_core::policy::{default_policy, load_policy, policy_digest, Policy, DEFAULT_POLICY_JSON};

/// Where the underwriting policy comes from. Both flags fall back to the
/// `LOAN_POLICY_PATH` / `LOAN_POLICY_CHECKSUM` environment variables, which
/// may also be set in a `.env` file.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicySource {
    /// Path to a JSON policy file (defaults to the built-in policy)
    #[arg(long = "policy", env = "LOAN_POLICY_PATH")]
    pub path: Option<String>,

    /// Expected SHA-256 of the policy file, hex encoded
    #[arg(long = "policy-checksum", env = "LOAN_POLICY_CHECKSUM")]
    pub checksum: Option<String>,
}

/// A policy together with how it was obtained.
#[derive(Debug)]
pub struct LoadedPolicy {
    pub policy: Policy,
    pub source: String,
    pub digest: String,
    pub verified: bool,
}

impl PolicySource {
    /// Load and validate the configured policy.
    ///
    /// With no path the built-in policy is used and is always checked against
    /// its built-in digest (or `--policy-checksum` when given). A policy file
    /// without a checksum is accepted but logged, since nothing vouches for it.
    pub fn load(&self) -> Result<LoadedPolicy, Box<dyn std::error::Error>> {
        match self.path {
            None => {
                let policy = match self.checksum {
                    Some(ref expected) => load_policy(DEFAULT_POLICY_JSON.as_bytes(), Some(expected.as_str()))?,
                    None => default_policy()?,
                };
                Ok(LoadedPolicy {
                    policy,
                    source: "built-in".into(),
                    digest: policy_digest(DEFAULT_POLICY_JSON.as_bytes()),
                    verified: true,
                })
            }
            Some(ref path) => {
                let bytes = read_policy_file(path)?;
                let checksum = self.checksum.as_deref();
                if checksum.is_none() {
                    warn!(path = %path, "policy file loaded without a checksum");
                }
                let policy = load_policy(&bytes, checksum)
                    .map_err(|e| format!("Policy '{}' rejected: {}", path, e))?;
                Ok(LoadedPolicy {
                    policy,
                    source: path.clone(),
                    digest: policy_digest(&bytes),
                    verified: checksum.is_some(),
                })
            }
        }
    }
}

pub fn read_policy_file(path: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let canonical = crate::input::file::resolve_path(path)?;
    let bytes = fs::read(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    Ok(bytes)
}

/// Log filter used when `RUST_LOG` is not set.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}
