//! Per-jurisdiction limitation periods

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Limitation period table keyed by upper-case state code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateLimits {
    limits: HashMap<String, f64>,
}

fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

impl StateLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(state, years)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (state, years) in pairs {
            table.insert(state.as_ref(), years)?;
        }
        Ok(table)
    }

    /// Set the limitation period for a state; years must be positive and finite
    pub fn insert(&mut self, state: &str, years: f64) -> Result<()> {
        let key = normalize_state(state);
        if key.is_empty() {
            return Err(AnalyticsError::Configuration(
                "limitation table entry has an empty state code".to_string(),
            ));
        }
        if !years.is_finite() || years <= 0.0 {
            return Err(AnalyticsError::Configuration(format!(
                "invalid limitation period for {}: {}",
                key, years
            )));
        }
        self.limits.insert(key, years);
        Ok(())
    }

    /// Limitation period in years for a state
    ///
    /// An unknown jurisdiction is a configuration error: a limitation period is
    /// never guessed.
    pub fn years_for(&self, state: &str) -> Result<f64> {
        let key = normalize_state(state);
        self.limits.get(&key).copied().ok_or_else(|| {
            AnalyticsError::Configuration(format!("no limitation period configured for state '{}'", key))
        })
    }

    pub fn contains(&self, state: &str) -> bool {
        self.limits.contains_key(&normalize_state(state))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Load from a CSV file with `state,years` columns
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::read(reader)
    }

    /// Load from any reader with `state,years` columns
    pub fn load_from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::read(csv::Reader::from_reader(reader))
    }

    fn read<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut table = Self::new();

        for result in reader.records() {
            let record = result?;
            let state = record.get(0).unwrap_or_default();
            let raw_years = record.get(1).unwrap_or_default().trim();
            let years: f64 = raw_years.parse().map_err(|_| AnalyticsError::InvalidField {
                field: "limitation_years",
                value: raw_years.to_string(),
            })?;
            table.insert(state, years)?;
        }

        log::debug!("Loaded limitation periods for {} states", table.len());
        Ok(table)
    }
}
