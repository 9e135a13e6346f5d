//! Claim records and the adapter that normalizes exported claim rows

mod data;
pub mod loader;

pub use data::{ClaimRecord, ClaimStatus, LitigationStage};
pub use loader::{load_claims, load_claims_from_reader, parse_date};
