pub mod application;
pub mod error;
pub mod policy;
pub mod time_value;
pub mod types;
pub mod underwriting;

#[cfg(test)]
mod proptest;

pub use error::UnderwritingError;
pub use types::*;

/// Standard result type for all underwriting operations
pub type UnderwritingResult<T> = Result<T, UnderwritingError>;
