use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnderwritingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Policy violation: {rule} — {detail}")]
    PolicyViolation { rule: String, detail: String },

    #[error("Policy checksum mismatch: expected {expected}, found {actual}. Get sign-off from the policy owner before updating the checked-in digest")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for UnderwritingError {
    fn from(e: serde_json::Error) -> Self {
        UnderwritingError::SerializationError(e.to_string())
    }
}
