//! Claim age estimation
//!
//! A real transfer date is always preferred. The claim-number prefix heuristic is
//! a fallback only, and its prefix→year mapping is supplied by the caller as a
//! versioned [`PrefixCalendar`]; no mapping is built in. Every estimate carries
//! its [`AgeSource`] so heuristic ages are visible downstream.

use crate::error::{AnalyticsError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DAYS_PER_YEAR: f64 = 365.25;

/// How a claim age was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AgeSource {
    /// Elapsed time since the transfer date
    TransferDate,
    /// Claim-number prefix looked up in a versioned calendar
    PrefixHeuristic { calendar_version: String },
    /// Neither a date nor a matching prefix was available
    Unavailable,
}

/// Estimated age of a claim in years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimAge {
    pub years: Option<f64>,
    pub source: AgeSource,
}

impl ClaimAge {
    /// Age for rule evaluation; an unavailable age triggers no age rule
    pub fn years_or_zero(&self) -> f64 {
        self.years.unwrap_or(0.0)
    }
}

/// Inclusive range of numeric claim prefixes issued in one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixBucket {
    pub min_prefix: u32,
    pub max_prefix: u32,
    pub year: i32,
}

/// Versioned mapping from claim-number prefix to issue year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixCalendar {
    pub version: String,

    /// Number of leading digits of the claim number that form the prefix
    pub prefix_digits: usize,

    pub buckets: Vec<PrefixBucket>,
}

impl PrefixCalendar {
    /// Build a calendar, rejecting empty, inverted or overlapping buckets
    pub fn new(version: impl Into<String>, prefix_digits: usize, buckets: Vec<PrefixBucket>) -> Result<Self> {
        let calendar = Self {
            version: version.into(),
            prefix_digits,
            buckets,
        };
        calendar.validate()?;
        Ok(calendar)
    }

    /// Load a calendar from JSON
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let calendar: PrefixCalendar = serde_json::from_reader(file)?;
        calendar.validate()?;
        Ok(calendar)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix_digits == 0 || self.prefix_digits > 9 {
            return Err(AnalyticsError::Configuration(format!(
                "prefix calendar {} must use 1-9 prefix digits, got {}",
                self.version, self.prefix_digits
            )));
        }

        let mut sorted = self.buckets.clone();
        sorted.sort_by_key(|b| b.min_prefix);
        for bucket in &sorted {
            if bucket.min_prefix > bucket.max_prefix {
                return Err(AnalyticsError::Configuration(format!(
                    "prefix calendar {} has inverted bucket {}-{}",
                    self.version, bucket.min_prefix, bucket.max_prefix
                )));
            }
        }
        if let Some(pair) = sorted.windows(2).find(|w| w[1].min_prefix <= w[0].max_prefix) {
            return Err(AnalyticsError::Configuration(format!(
                "prefix calendar {} has overlapping buckets {}-{} and {}-{}",
                self.version, pair[0].min_prefix, pair[0].max_prefix, pair[1].min_prefix, pair[1].max_prefix
            )));
        }
        Ok(())
    }

    /// Numeric prefix of a claim number: the first run of digits, truncated
    fn prefix_of(&self, claim_number: &str) -> Option<u32> {
        let digits: String = claim_number
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .take(self.prefix_digits)
            .collect();

        if digits.len() < self.prefix_digits {
            return None;
        }
        digits.parse().ok()
    }

    /// Issue year implied by a claim number, if its prefix falls in a bucket
    pub fn year_for(&self, claim_number: &str) -> Option<i32> {
        let prefix = self.prefix_of(claim_number)?;
        self.buckets
            .iter()
            .find(|b| prefix >= b.min_prefix && prefix <= b.max_prefix)
            .map(|b| b.year)
    }
}

/// Claim age estimator: transfer date first, prefix calendar as fallback
#[derive(Debug, Clone, Default)]
pub struct ClaimAgeEstimator {
    calendar: Option<PrefixCalendar>,
}

impl ClaimAgeEstimator {
    /// Date-only estimator
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator that falls back to the given prefix calendar
    pub fn with_calendar(calendar: PrefixCalendar) -> Self {
        Self {
            calendar: Some(calendar),
        }
    }

    pub fn calendar(&self) -> Option<&PrefixCalendar> {
        self.calendar.as_ref()
    }

    /// Years elapsed since the transfer date; future dates give zero
    pub fn from_transfer_date(transfer_date: NaiveDate, as_of: NaiveDate) -> f64 {
        let days = (as_of - transfer_date).num_days();
        if days < 0 {
            log::warn!("Transfer date {} is after as-of date {}", transfer_date, as_of);
            return 0.0;
        }
        days as f64 / DAYS_PER_YEAR
    }

    pub fn estimate(&self, claim_number: &str, transfer_date: Option<NaiveDate>, as_of: NaiveDate) -> ClaimAge {
        if let Some(date) = transfer_date {
            return ClaimAge {
                years: Some(Self::from_transfer_date(date, as_of)),
                source: AgeSource::TransferDate,
            };
        }

        if let Some(calendar) = &self.calendar {
            if let Some(year) = calendar.year_for(claim_number) {
                log::debug!(
                    "Claim {} aged from prefix calendar {} (year {})",
                    claim_number, calendar.version, year
                );
                return ClaimAge {
                    years: Some((as_of.year() - year).max(0) as f64),
                    source: AgeSource::PrefixHeuristic {
                        calendar_version: calendar.version.clone(),
                    },
                };
            }
        }

        ClaimAge {
            years: None,
            source: AgeSource::Unavailable,
        }
    }
}
