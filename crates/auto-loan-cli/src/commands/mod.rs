pub mod policy;
pub mod underwriting;
