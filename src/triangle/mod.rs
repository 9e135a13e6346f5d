//! Loss development triangle and factor engine
//!
//! Converts raw `(accident_year, development_months, metric, amount)` points into
//! a sparse accident-year × development-month triangle, then derives:
//! - **Age-to-age factors**: per-year link ratios with simple and volume-weighted averages
//! - **Selected factors**: weighted ?? simple ?? 1.000, tagged with their basis
//! - **Cumulative development factors**: suffix products to ultimate, tail fixed at 1.000
//!
//! # Example
//!
//! ```rust,ignore
//! use claims_analytics::triangle::{build_triangle, develop, MetricType};
//! use claims_analytics::config::DEFAULT_DEVELOPMENT_AXIS;
//!
//! let triangle = build_triangle(&points, MetricType::LossRatio);
//! let report = develop(&triangle, &DEFAULT_DEVELOPMENT_AXIS);
//! for factor in &report.selected {
//!     println!("{}", factor);
//! }
//! ```

mod points;
mod builder;
mod factors;
pub mod loader;

pub use points::{MetricPoint, MetricType};

pub use builder::{
    build_triangle,
    DuplicateCell,
    LatestCell,
    MonotonicityViolation,
    SkippedPoint,
    Triangle,
};

pub use factors::{
    compute_age_to_age,
    cumulative_to_ultimate,
    develop,
    select_ata,
    AgeToAgeFactor,
    CdfEntry,
    DevelopmentReport,
    FactorBasis,
    SelectedFactor,
    UltimateProjection,
    FACTOR_DECIMALS,
    NO_DEVELOPMENT,
};

pub use loader::{load_points, load_points_from_reader};
