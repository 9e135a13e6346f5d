//! Statute-of-limitations breach evaluation
//!
//! For each claim: trigger date = exposure create date + the state's limitation
//! period, then `days_until_expiry = trigger - as_of`. Negative is a breach; within
//! the approaching window (inclusive) is a warning.

use super::limits::StateLimits;
use crate::claims::{ClaimRecord, ClaimStatus};
use crate::config::{EngineConfig, DEFAULT_APPROACHING_WINDOW_DAYS};
use crate::error::{AnalyticsError, BatchOutcome, Result};
use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

/// Breach status of a claim relative to its limitation deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolClassification {
    Breached,
    Approaching,
    NotFlagged,
}

impl SolClassification {
    /// Step function over days remaining
    pub fn from_days(days_until_expiry: i64, approaching_window_days: i64) -> Self {
        if days_until_expiry < 0 {
            SolClassification::Breached
        } else if days_until_expiry <= approaching_window_days {
            SolClassification::Approaching
        } else {
            SolClassification::NotFlagged
        }
    }

    pub fn is_flagged(&self) -> bool {
        !matches!(self, SolClassification::NotFlagged)
    }
}

/// Point-in-time SOL projection for one claim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolRecord {
    pub claim_number: String,
    pub state: String,
    pub exposure_create_date: NaiveDate,
    pub status: ClaimStatus,
    pub limitation_years: f64,
    pub limitation_trigger_date: NaiveDate,

    /// Whole days from the as-of date to the trigger date; negative means breached
    pub days_until_expiry: i64,

    pub reserves: f64,
    pub classification: SolClassification,
}

/// Add a limitation period to a date
///
/// The period is converted to whole months (fractional years rounded to the
/// nearest month). Day-of-month is preserved where the target month allows and
/// clamped to the month end otherwise, so Feb 29 + 1 year lands on Feb 28.
pub fn add_limitation_period(start: NaiveDate, years: f64) -> Option<NaiveDate> {
    let months = (years * 12.0).round();
    if !months.is_finite() || months < 0.0 || months > u32::MAX as f64 {
        return None;
    }
    start.checked_add_months(Months::new(months as u32))
}

/// SOL evaluator with a configurable warning window
#[derive(Debug, Clone, Copy)]
pub struct SolEvaluator {
    approaching_window_days: i64,
}

impl Default for SolEvaluator {
    fn default() -> Self {
        Self {
            approaching_window_days: DEFAULT_APPROACHING_WINDOW_DAYS,
        }
    }
}

impl SolEvaluator {
    /// Evaluator with a custom warning window; the window cannot be negative
    pub fn new(approaching_window_days: i64) -> Result<Self> {
        if approaching_window_days < 0 {
            return Err(AnalyticsError::Configuration(format!(
                "approaching window cannot be negative: {}",
                approaching_window_days
            )));
        }
        Ok(Self { approaching_window_days })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.approaching_window_days)
    }

    pub fn approaching_window_days(&self) -> i64 {
        self.approaching_window_days
    }

    /// Evaluate a single claim
    ///
    /// Fails with a configuration error when the state is missing or has no
    /// limitation period on file, and with a data gap when the exposure create
    /// date is missing.
    pub fn evaluate(&self, claim: &ClaimRecord, limits: &StateLimits, as_of: NaiveDate) -> Result<SolRecord> {
        let state = claim.state.as_deref().map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
            AnalyticsError::Configuration(format!("claim {} has no state", claim.claim_number))
        })?;
        let limitation_years = limits.years_for(state)?;

        let exposure_create_date = claim
            .exposure_create_date
            .ok_or_else(|| AnalyticsError::data_gap(&claim.claim_number, "exposure_create_date"))?;

        let limitation_trigger_date = add_limitation_period(exposure_create_date, limitation_years)
            .ok_or_else(|| {
                AnalyticsError::Configuration(format!(
                    "limitation period of {} years from {} is out of range",
                    limitation_years, exposure_create_date
                ))
            })?;

        let days_until_expiry = (limitation_trigger_date - as_of).num_days();
        let classification = SolClassification::from_days(days_until_expiry, self.approaching_window_days);

        log::debug!(
            "Claim {} ({}): trigger {}, {} days, {:?}",
            claim.claim_number, state, limitation_trigger_date, days_until_expiry, classification
        );

        Ok(SolRecord {
            claim_number: claim.claim_number.clone(),
            state: state.to_ascii_uppercase(),
            exposure_create_date,
            status: claim.status.clone(),
            limitation_years,
            limitation_trigger_date,
            days_until_expiry,
            reserves: claim.reserves,
            classification,
        })
    }

    /// Evaluate every claim accepted by `include`, in parallel
    ///
    /// The status filter is supplied by the caller so different views can share
    /// the engine. Failures are isolated per claim.
    pub fn evaluate_batch<F>(
        &self,
        claims: &[ClaimRecord],
        limits: &StateLimits,
        as_of: NaiveDate,
        include: F,
    ) -> BatchOutcome<SolRecord>
    where
        F: Fn(&ClaimRecord) -> bool + Sync,
    {
        let evaluated: Vec<(String, Result<SolRecord>)> = claims
            .par_iter()
            .filter(|claim| include(*claim))
            .map(|claim| (claim.claim_number.clone(), self.evaluate(claim, limits, as_of)))
            .collect();

        let outcome = BatchOutcome::from_results(evaluated);
        log::info!(
            "SOL evaluation as of {}: {} evaluated, {} excluded",
            as_of,
            outcome.results.len(),
            outcome.excluded_count()
        );
        outcome
    }
}

/// Evaluate one claim with the default 90-day approaching window
pub fn evaluate(claim: &ClaimRecord, limits: &StateLimits, as_of: NaiveDate) -> Result<SolRecord> {
    SolEvaluator::default().evaluate(claim, limits, as_of)
}
