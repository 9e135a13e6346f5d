//! Claims Analytics - risk and reserving signals for a litigated claims portfolio
//!
//! This library provides:
//! - Loss development triangles with age-to-age and cumulative development factors
//! - Statute-of-limitations breach and approaching-deadline detection
//! - Executive review composite scoring with auditable reasons
//! - Portfolio roll-ups by jurisdiction and review level
//! - Adapters that normalize exported claim and metric rows

pub mod error;
pub mod config;
pub mod claims;
pub mod triangle;
pub mod sol;
pub mod review;
pub mod aggregate;
pub mod engine;

// Re-export commonly used types
pub use error::{AnalyticsError, BatchOutcome, UnitFailure};
pub use config::{EngineConfig, ScoreThresholds};
pub use claims::{ClaimRecord, ClaimStatus, LitigationStage};
pub use triangle::{MetricPoint, MetricType, Triangle, DevelopmentReport};
pub use sol::{SolEvaluator, SolRecord, StateLimits};
pub use review::{ClaimAgeEstimator, ExecutiveReviewResult, ReviewLevel, ReviewScorer};
pub use engine::AnalyticsEngine;
