//! Portfolio roll-ups of per-claim results
//!
//! Every summary is built from per-shard partials combined with an associative
//! `merge`, so the reductions run on rayon's fold/reduce. Both summaries carry
//! the number of excluded claims, including rows dropped while loading; the
//! review summary also counts claims scored without a reliable age.

use crate::error::BatchOutcome;
use crate::review::{AgeSource, ReviewLevel, ScoredClaim};
use crate::sol::{SolClassification, SolRecord};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// SOL exposure for one jurisdiction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateExposure {
    pub state: String,
    pub claim_count: usize,
    pub total_reserves: f64,
    pub breached: usize,
    pub approaching: usize,
}

impl StateExposure {
    fn new(state: &str) -> Self {
        Self {
            state: state.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, record: &SolRecord) {
        self.claim_count += 1;
        self.total_reserves += record.reserves;
        match record.classification {
            SolClassification::Breached => self.breached += 1,
            SolClassification::Approaching => self.approaching += 1,
            SolClassification::NotFlagged => {}
        }
    }

    /// Combine two partials for the same state
    pub fn merge(&mut self, other: &StateExposure) {
        self.claim_count += other.claim_count;
        self.total_reserves += other.total_reserves;
        self.breached += other.breached;
        self.approaching += other.approaching;
    }
}

type StateShard = HashMap<String, StateExposure>;

fn merge_shards(mut left: StateShard, right: StateShard) -> StateShard {
    for (state, exposure) in right {
        left.entry(state)
            .and_modify(|e| e.merge(&exposure))
            .or_insert(exposure);
    }
    left
}

/// Portfolio view of SOL results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolPortfolioSummary {
    /// Sorted by total reserves descending, then state code
    pub by_state: Vec<StateExposure>,
    pub total_claims: usize,
    pub total_reserves: f64,
    pub breached: usize,
    pub approaching: usize,

    /// Claims that failed evaluation and are absent from every figure above
    pub excluded_count: usize,
}

impl SolPortfolioSummary {
    /// The `n` jurisdictions with the largest reserves
    pub fn top_states(&self, n: usize) -> &[StateExposure] {
        &self.by_state[..n.min(self.by_state.len())]
    }
}

/// Group evaluated SOL records by state
pub fn summarize_sol(outcome: &BatchOutcome<SolRecord>) -> SolPortfolioSummary {
    let shards = outcome
        .results
        .par_iter()
        .fold(StateShard::new, |mut shard, record| {
            shard
                .entry(record.state.clone())
                .or_insert_with(|| StateExposure::new(&record.state))
                .add(record);
            shard
        })
        .reduce(StateShard::new, merge_shards);

    let mut by_state: Vec<StateExposure> = shards.into_values().collect();
    by_state.sort_by(|a, b| {
        b.total_reserves
            .total_cmp(&a.total_reserves)
            .then_with(|| a.state.cmp(&b.state))
    });

    let summary = SolPortfolioSummary {
        total_claims: by_state.iter().map(|s| s.claim_count).sum(),
        total_reserves: by_state.iter().map(|s| s.total_reserves).sum(),
        breached: by_state.iter().map(|s| s.breached).sum(),
        approaching: by_state.iter().map(|s| s.approaching).sum(),
        excluded_count: outcome.excluded_count(),
        by_state,
    };

    if summary.excluded_count > 0 {
        log::warn!(
            "SOL summary covers {} claims; {} excluded",
            summary.total_claims, summary.excluded_count
        );
    }

    summary
}

/// Counts of claims per review level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewPortfolioSummary {
    pub none: usize,
    pub watch: usize,
    pub required: usize,
    pub critical: usize,

    /// Claims whose age came from the prefix heuristic
    pub age_from_heuristic: usize,

    /// Claims scored without any age (age rules could not fire)
    pub age_unavailable: usize,

    /// Claims that were never scored and are absent from every count above
    pub excluded_count: usize,
}

impl ReviewPortfolioSummary {
    fn add(mut self, scored: &ScoredClaim) -> Self {
        match scored.review.level {
            ReviewLevel::None => self.none += 1,
            ReviewLevel::Watch => self.watch += 1,
            ReviewLevel::Required => self.required += 1,
            ReviewLevel::Critical => self.critical += 1,
        }
        match scored.age.source {
            AgeSource::TransferDate => {}
            AgeSource::PrefixHeuristic { .. } => self.age_from_heuristic += 1,
            AgeSource::Unavailable => self.age_unavailable += 1,
        }
        self
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            none: self.none + other.none,
            watch: self.watch + other.watch,
            required: self.required + other.required,
            critical: self.critical + other.critical,
            age_from_heuristic: self.age_from_heuristic + other.age_from_heuristic,
            age_unavailable: self.age_unavailable + other.age_unavailable,
            excluded_count: self.excluded_count + other.excluded_count,
        }
    }

    pub fn total(&self) -> usize {
        self.none + self.watch + self.required + self.critical
    }

    /// Claims at Required or above
    pub fn needing_review(&self) -> usize {
        self.required + self.critical
    }
}

/// Count scored claims per level
pub fn summarize_reviews(outcome: &BatchOutcome<ScoredClaim>) -> ReviewPortfolioSummary {
    let summary = outcome
        .results
        .par_iter()
        .fold(ReviewPortfolioSummary::default, ReviewPortfolioSummary::add)
        .reduce(ReviewPortfolioSummary::default, ReviewPortfolioSummary::merge);

    ReviewPortfolioSummary {
        excluded_count: outcome.excluded_count(),
        ..summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimStatus;
    use crate::error::AnalyticsError;
    use crate::review::{ClaimAge, ExecutiveReviewResult};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn record(claim: &str, state: &str, reserves: f64, days: i64) -> SolRecord {
        let created = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        SolRecord {
            claim_number: claim.to_string(),
            state: state.to_string(),
            exposure_create_date: created,
            status: ClaimStatus::InProgress,
            limitation_years: 2.0,
            limitation_trigger_date: created,
            days_until_expiry: days,
            reserves,
            classification: SolClassification::from_days(days, 90),
        }
    }

    #[test]
    fn test_sol_summary_groups_by_state() {
        let outcome = BatchOutcome::from_results(vec![
            ("A".to_string(), Ok(record("A", "TX", 100.0, -5))),
            ("B".to_string(), Ok(record("B", "CA", 500.0, 30))),
            ("C".to_string(), Ok(record("C", "TX", 250.0, 400))),
            ("D".to_string(), Err(AnalyticsError::Configuration("no limit for ZZ".into()))),
        ]);

        let summary = summarize_sol(&outcome);
        assert_eq!(summary.by_state.len(), 2);
        assert_eq!(summary.by_state[0].state, "CA");
        assert_eq!(summary.by_state[1].state, "TX");
        assert_eq!(summary.by_state[1].claim_count, 2);
        assert_relative_eq!(summary.by_state[1].total_reserves, 350.0);
        assert_eq!(summary.by_state[1].breached, 1);
        assert_eq!(summary.total_claims, 3);
        assert_eq!(summary.breached, 1);
        assert_eq!(summary.approaching, 1);
        assert_eq!(summary.excluded_count, 1);
        assert_eq!(summary.top_states(1)[0].state, "CA");
        assert_eq!(summary.top_states(10).len(), 2);
    }

    #[test]
    fn test_state_merge_is_associative() {
        let mut a = StateExposure::new("TX");
        a.add(&record("A", "TX", 10.0, -1));
        let mut b = StateExposure::new("TX");
        b.add(&record("B", "TX", 20.0, 10));
        let mut c = StateExposure::new("TX");
        c.add(&record("C", "TX", 30.0, 500));

        let mut left = a.clone();
        left.merge(&b);
        left.merge(&c);

        let mut bc = b.clone();
        bc.merge(&c);
        let mut right = a.clone();
        right.merge(&bc);

        assert_eq!(left, right);
    }

    fn scored(level: ReviewLevel, source: AgeSource) -> ScoredClaim {
        ScoredClaim {
            claim_number: "X".to_string(),
            age: ClaimAge { years: None, source },
            review: ExecutiveReviewResult { level, score: 0, reasons: Vec::new() },
        }
    }

    #[test]
    fn test_review_summary_counts() {
        let outcome = BatchOutcome::from_results(vec![
            ("A".to_string(), Ok(scored(ReviewLevel::Critical, AgeSource::TransferDate))),
            ("B".to_string(), Ok(scored(ReviewLevel::Critical, AgeSource::Unavailable))),
            (
                "C".to_string(),
                Ok(scored(ReviewLevel::Watch, AgeSource::PrefixHeuristic { calendar_version: "v1".into() })),
            ),
            ("row 4".to_string(), Err(AnalyticsError::data_gap("claim row", "claim_number"))),
            ("E".to_string(), Ok(scored(ReviewLevel::None, AgeSource::TransferDate))),
        ]);
        let summary = summarize_reviews(&outcome);

        assert_eq!(summary.critical, 2);
        assert_eq!(summary.watch, 1);
        assert_eq!(summary.none, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.needing_review(), 2);
        assert_eq!(summary.age_unavailable, 1);
        assert_eq!(summary.age_from_heuristic, 1);
        assert_eq!(summary.excluded_count, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let summary = summarize_sol(&BatchOutcome::from_results(Vec::new()));
        assert!(summary.by_state.is_empty());
        assert_eq!(summary.total_claims, 0);
        assert_eq!(
            summarize_reviews(&BatchOutcome::complete(Vec::new())),
            ReviewPortfolioSummary::default()
        );
    }
}
