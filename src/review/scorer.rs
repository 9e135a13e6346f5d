//! Executive review composite scorer
//!
//! Additive rule evaluation. Rules fire independently except within the age,
//! pain-escalation and max-pain groups, where only the highest matching tier
//! fires. Reasons are emitted in rule order.

use super::age::{ClaimAge, ClaimAgeEstimator};
use crate::claims::{ClaimRecord, LitigationStage};
use crate::config::{default_large_loss_markers, EngineConfig, ScoreThresholds};
use crate::error::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

/// Reactive spend above which the no-expert rule fires
pub const REACTIVE_SPEND_THRESHOLD: f64 = 10_000.0;

/// Executive attention level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewLevel {
    None,
    Watch,
    Required,
    Critical,
}

impl ReviewLevel {
    /// Step function of the score
    pub fn from_score(score: u32, thresholds: &ScoreThresholds) -> Self {
        if score >= thresholds.critical {
            ReviewLevel::Critical
        } else if score >= thresholds.required {
            ReviewLevel::Required
        } else if score >= thresholds.watch {
            ReviewLevel::Watch
        } else {
            ReviewLevel::None
        }
    }
}

/// Attributes the scorer reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewInput {
    pub claim_age_years: f64,
    pub litigation_stage: LitigationStage,
    pub expert_spend: f64,
    pub reactive_spend: f64,
    pub pain_escalation: u32,
    pub max_pain: u32,
    pub expense_category: String,
}

impl ReviewInput {
    pub fn from_claim(claim: &ClaimRecord, claim_age_years: f64) -> Self {
        Self {
            claim_age_years,
            litigation_stage: claim.litigation_stage,
            expert_spend: claim.expert_spend,
            reactive_spend: claim.reactive_spend,
            pain_escalation: claim.pain_escalation,
            max_pain: claim.max_pain,
            expense_category: claim.expense_category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveReviewResult {
    pub level: ReviewLevel,
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Score for one claim along with how its age was derived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredClaim {
    pub claim_number: String,
    pub age: ClaimAge,
    pub review: ExecutiveReviewResult,
}

#[derive(Debug, Clone)]
pub struct ReviewScorer {
    thresholds: ScoreThresholds,

    /// Upper-cased, non-empty markers
    large_loss_markers: Vec<String>,
}

impl Default for ReviewScorer {
    fn default() -> Self {
        Self::with_validated(ScoreThresholds::default(), default_large_loss_markers())
    }
}

impl ReviewScorer {
    /// Scorer with injected thresholds and markers; thresholds must strictly increase
    pub fn new(thresholds: ScoreThresholds, large_loss_markers: Vec<String>) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self::with_validated(thresholds, large_loss_markers))
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.score_thresholds, config.large_loss_markers.clone())
    }

    fn with_validated(thresholds: ScoreThresholds, large_loss_markers: Vec<String>) -> Self {
        let large_loss_markers = large_loss_markers
            .into_iter()
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();

        Self {
            thresholds,
            large_loss_markers,
        }
    }

    pub fn thresholds(&self) -> &ScoreThresholds {
        &self.thresholds
    }

    fn large_loss_marker(&self, expense_category: &str) -> Option<&str> {
        let category = expense_category.trim().to_uppercase();
        if category.is_empty() {
            return None;
        }
        self.large_loss_markers
            .iter()
            .find(|m| category.contains(m.as_str()))
            .map(String::as_str)
    }

    pub fn score(&self, input: &ReviewInput) -> ExecutiveReviewResult {
        let mut score = 0u32;
        let mut reasons = Vec::new();
        let mut add = |points: u32, reason: String| {
            score += points;
            reasons.push(reason);
        };

        let age = input.claim_age_years;
        if age >= 7.0 {
            add(40, format!("Claim age {:.1} years (7+ years)", age));
        } else if age >= 5.0 {
            add(25, format!("Claim age {:.1} years (5+ years)", age));
        } else if age >= 3.0 {
            add(10, format!("Claim age {:.1} years (3+ years)", age));
        }

        let no_expert = input.expert_spend <= 0.0;
        if input.litigation_stage.is_late() && no_expert {
            add(20, "Late-stage litigation with no expert spend".to_string());
        }

        if input.reactive_spend > REACTIVE_SPEND_THRESHOLD && no_expert {
            add(
                15,
                format!("Reactive spend {:.0} with no expert spend", input.reactive_spend),
            );
        }

        if input.pain_escalation >= 4 {
            add(20, format!("Pain escalated {} times (4+)", input.pain_escalation));
        } else if input.pain_escalation >= 2 {
            add(10, format!("Pain escalated {} times (2+)", input.pain_escalation));
        }

        if input.max_pain >= 9 {
            add(15, format!("Max pain level {} (9+)", input.max_pain));
        } else if input.max_pain >= 8 {
            add(10, format!("Max pain level {} (8+)", input.max_pain));
        }

        if let Some(marker) = self.large_loss_marker(&input.expense_category) {
            add(
                15,
                format!("Large-loss expense category '{}' ({})", input.expense_category.trim(), marker),
            );
        }

        ExecutiveReviewResult {
            level: ReviewLevel::from_score(score, &self.thresholds),
            score,
            reasons,
        }
    }

    /// Estimate the claim's age and score it
    pub fn score_claim(&self, claim: &ClaimRecord, estimator: &ClaimAgeEstimator, as_of: NaiveDate) -> ScoredClaim {
        let age = estimator.estimate(&claim.claim_number, claim.transfer_date, as_of);
        let input = ReviewInput::from_claim(claim, age.years_or_zero());
        let review = self.score(&input);

        log::debug!(
            "Claim {}: score {} ({:?}), age source {:?}",
            claim.claim_number, review.score, review.level, age.source
        );

        ScoredClaim {
            claim_number: claim.claim_number.clone(),
            age,
            review,
        }
    }

    /// Score a portfolio in parallel, preserving input order
    pub fn score_batch(&self, claims: &[ClaimRecord], estimator: &ClaimAgeEstimator, as_of: NaiveDate) -> Vec<ScoredClaim> {
        claims
            .par_iter()
            .map(|claim| self.score_claim(claim, estimator, as_of))
            .collect()
    }
}

/// Score with default thresholds and markers
pub fn score(input: &ReviewInput) -> ExecutiveReviewResult {
    ReviewScorer::default().score(input)
}
