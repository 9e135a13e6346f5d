//! Analytics engine for portfolio runs
//!
//! Holds the configuration, limitation table and age estimator once, then runs
//! the triangle, SOL and review components against any supplied inputs.

use crate::aggregate::{summarize_reviews, summarize_sol, ReviewPortfolioSummary, SolPortfolioSummary};
use crate::claims::ClaimRecord;
use crate::config::EngineConfig;
use crate::error::{BatchOutcome, Result, UnitFailure};
use crate::review::{ClaimAgeEstimator, ReviewScorer, ScoredClaim};
use crate::sol::{SolEvaluator, SolRecord, StateLimits};
use crate::triangle::{
    build_triangle, develop, DevelopmentReport, DuplicateCell, MetricPoint, MetricType,
    MonotonicityViolation, SkippedPoint, UltimateProjection,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Development analysis plus the triangle's validation signals
#[derive(Debug, Clone, Serialize)]
pub struct TriangleAnalysis {
    pub accident_years: Vec<i32>,
    pub development: DevelopmentReport,
    pub ultimates: Vec<UltimateProjection>,
    pub duplicates: Vec<DuplicateCell>,
    pub skipped: Vec<SkippedPoint>,
    pub monotonicity_violations: Vec<MonotonicityViolation>,

    /// Point rows that could not be loaded
    pub load_failures: Vec<UnitFailure>,
}

/// SOL results with their portfolio summary
#[derive(Debug, Clone, Serialize)]
pub struct SolAnalysis {
    pub outcome: BatchOutcome<SolRecord>,
    pub summary: SolPortfolioSummary,
}

/// Review scores with their portfolio summary
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAnalysis {
    pub outcome: BatchOutcome<ScoredClaim>,
    pub summary: ReviewPortfolioSummary,
}

/// Pre-configured engine for batch runs
///
/// # Example
/// ```ignore
/// let engine = AnalyticsEngine::new(EngineConfig::default(), limits)?;
/// let claims = load_claims("claims.csv")?;
/// let sol = engine.run_sol(&claims, as_of, |c| c.status.is_actionable());
/// let reviews = engine.run_reviews(&claims, as_of);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: EngineConfig,
    limits: StateLimits,
    estimator: ClaimAgeEstimator,
    sol: SolEvaluator,
    scorer: ReviewScorer,
}

impl AnalyticsEngine {
    /// Create an engine with a date-only age estimator
    pub fn new(config: EngineConfig, limits: StateLimits) -> Result<Self> {
        Self::with_estimator(config, limits, ClaimAgeEstimator::new())
    }

    /// Create an engine with a caller-supplied age estimator
    pub fn with_estimator(config: EngineConfig, limits: StateLimits, estimator: ClaimAgeEstimator) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sol: SolEvaluator::from_config(&config)?,
            scorer: ReviewScorer::from_config(&config)?,
            config,
            limits,
            estimator,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn limits(&self) -> &StateLimits {
        &self.limits
    }

    /// Build and develop the triangle for one metric over the configured axis
    pub fn run_triangle(&self, points: &BatchOutcome<MetricPoint>, metric_type: MetricType) -> TriangleAnalysis {
        let triangle = build_triangle(&points.results, metric_type);
        let development = develop(&triangle, &self.config.development_axis);
        let ultimates = development.projected_ultimates(&triangle);
        let monotonicity_violations = triangle.monotonicity_violations();

        if !monotonicity_violations.is_empty() {
            log::warn!(
                "{} triangle has {} monotonicity violation(s)",
                metric_type,
                monotonicity_violations.len()
            );
        }

        TriangleAnalysis {
            accident_years: triangle.years(),
            development,
            ultimates,
            duplicates: triangle.duplicates,
            skipped: triangle.skipped,
            monotonicity_violations,
            load_failures: points.failures.clone(),
        }
    }

    /// Evaluate SOL for claims accepted by `include` and summarize by state
    ///
    /// Rows that failed to load count as excluded alongside claims that fail
    /// evaluation.
    pub fn run_sol<F>(&self, claims: &BatchOutcome<ClaimRecord>, as_of: NaiveDate, include: F) -> SolAnalysis
    where
        F: Fn(&ClaimRecord) -> bool + Sync,
    {
        let outcome = self
            .sol
            .evaluate_batch(&claims.results, &self.limits, as_of, include)
            .with_prior_failures(&claims.failures);
        let summary = summarize_sol(&outcome);
        SolAnalysis { outcome, summary }
    }

    /// Score every loaded claim and count review levels
    pub fn run_reviews(&self, claims: &BatchOutcome<ClaimRecord>, as_of: NaiveDate) -> ReviewAnalysis {
        let scored = self.scorer.score_batch(&claims.results, &self.estimator, as_of);
        let outcome = BatchOutcome::complete(scored).with_prior_failures(&claims.failures);
        let summary = summarize_reviews(&outcome);
        log::info!(
            "Scored {} claims: {} critical, {} required, {} excluded",
            summary.total(),
            summary.critical,
            summary.required,
            summary.excluded_count
        );
        ReviewAnalysis { outcome, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{load_claims_from_reader, ClaimStatus, LitigationStage};
    use crate::config::ScoreThresholds;
    use crate::review::ReviewLevel;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> AnalyticsEngine {
        let limits = StateLimits::from_pairs([("TX", 2.0), ("CA", 2.0)]).unwrap();
        AnalyticsEngine::new(EngineConfig::default(), limits).unwrap()
    }

    fn claims() -> BatchOutcome<ClaimRecord> {
        let mut a = ClaimRecord::new("CLM-A");
        a.state = Some("TX".into());
        a.exposure_create_date = Some(date(2020, 1, 10));
        a.status = ClaimStatus::InProgress;
        a.reserves = 40_000.0;
        a.transfer_date = Some(date(2015, 1, 1));
        a.litigation_stage = LitigationStage::VeryLate;
        a.max_pain = 9;

        let mut b = ClaimRecord::new("CLM-B");
        b.state = Some("NV".into());
        b.exposure_create_date = Some(date(2021, 1, 1));
        b.status = ClaimStatus::InProgress;

        let mut c = ClaimRecord::new("CLM-C");
        c.state = Some("CA".into());
        c.exposure_create_date = Some(date(2019, 1, 1));
        c.status = ClaimStatus::Settled;

        BatchOutcome::complete(vec![a, b, c])
    }

    #[test]
    fn test_run_sol_partial_coverage() {
        let analysis = engine().run_sol(&claims(), date(2022, 1, 5), |c| c.status.is_actionable());

        assert_eq!(analysis.outcome.results.len(), 1);
        assert_eq!(analysis.outcome.failures[0].unit_id, "CLM-B");
        assert_eq!(analysis.summary.approaching, 1);
        assert_eq!(analysis.summary.excluded_count, 1);
    }

    #[test]
    fn test_run_reviews() {
        let analysis = engine().run_reviews(&claims(), date(2023, 1, 1));

        let scored = &analysis.outcome.results;
        assert_eq!(scored.len(), 3);
        // 8 years + late stage without expert + max pain 9
        assert_eq!(scored[0].review.score, 40 + 20 + 15);
        assert_eq!(scored[0].review.level, ReviewLevel::Critical);
        assert_eq!(analysis.summary.critical, 1);
        assert_eq!(analysis.summary.age_unavailable, 2);
        assert_eq!(analysis.summary.excluded_count, 0);
    }

    #[test]
    fn test_load_exclusions_reach_summaries() {
        let data = "\
ClaimNumber,State,ExposureCreateDate,Status
CLM-1,TX,2020-01-10,In Progress
CLM-2,TX,13/45/2020,In Progress
CLM-3,CA,2021-06-01,In Progress
";
        let loaded = load_claims_from_reader(data.as_bytes()).unwrap();
        let engine = engine();

        let sol = engine.run_sol(&loaded, date(2022, 1, 5), |c| c.status.is_actionable());
        assert_eq!(sol.outcome.results.len(), 2);
        assert_eq!(sol.summary.total_claims, 2);
        assert_eq!(sol.summary.excluded_count, 1);
        assert_eq!(sol.outcome.failures[0].unit_id, "CLM-2");

        let reviews = engine.run_reviews(&loaded, date(2022, 1, 5));
        assert_eq!(reviews.summary.total(), 2);
        assert_eq!(reviews.summary.excluded_count, 1);
        assert_eq!(reviews.outcome.failures[0].unit_id, "CLM-2");
    }

    #[test]
    fn test_run_triangle() {
        let points = BatchOutcome::complete(vec![
            MetricPoint::new(2019, 12, MetricType::GrossPaid, 100.0),
            MetricPoint::new(2019, 24, MetricType::GrossPaid, 90.0),
            MetricPoint::new(2020, 12, MetricType::GrossPaid, 120.0),
            MetricPoint::new(2020, 12, MetricType::GrossPaid, 125.0),
            MetricPoint::new(2020, 24, MetricType::GrossPaid, f64::NAN),
        ]);
        let analysis = engine().run_triangle(&points, MetricType::GrossPaid);

        assert_eq!(analysis.accident_years, vec![2019, 2020]);
        assert_eq!(analysis.development.age_to_age.len(), 7);
        assert_eq!(analysis.development.cdf.len(), 8);
        assert_eq!(analysis.duplicates.len(), 1);
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.skipped[0].accident_year, 2020);
        assert!(analysis.load_failures.is_empty());
        assert_eq!(analysis.monotonicity_violations.len(), 1);
        assert_eq!(analysis.ultimates.len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            development_axis: vec![24, 12],
            ..Default::default()
        };
        assert!(AnalyticsEngine::new(config, StateLimits::new()).is_err());

        let config = EngineConfig {
            score_thresholds: ScoreThresholds { watch: 30, required: 30, critical: 50 },
            ..Default::default()
        };
        assert!(AnalyticsEngine::new(config, StateLimits::new()).is_err());
    }
}
