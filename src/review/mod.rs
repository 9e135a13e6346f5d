//! Executive review scoring
//!
//! Classifies a claim's need for executive attention from its age, litigation
//! stage, spend pattern, pain escalation and complexity markers:
//!
//! | Rule | Points |
//! |---|---|
//! | age ≥ 7 / ≥ 5 / ≥ 3 years (highest tier only) | 40 / 25 / 10 |
//! | late-stage litigation, no expert spend | 20 |
//! | reactive spend > 10,000, no expert spend | 15 |
//! | pain escalations ≥ 4 / ≥ 2 (highest tier only) | 20 / 10 |
//! | max pain ≥ 9 / ≥ 8 (highest tier only) | 15 / 10 |
//! | large-loss expense category | 15 |

mod age;
mod scorer;

pub use age::{AgeSource, ClaimAge, ClaimAgeEstimator, PrefixBucket, PrefixCalendar};
pub use scorer::{
    score,
    ExecutiveReviewResult,
    ReviewInput,
    ReviewLevel,
    ReviewScorer,
    ScoredClaim,
    REACTIVE_SPEND_THRESHOLD,
};
