//! Engine configuration
//!
//! Every policy knob (development axis, SOL warning window, review thresholds,
//! large-loss markers) is injected through [`EngineConfig`] so jurisdictions and
//! review policies can change without code edits.

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Canonical development-month axis used when none is configured
pub const DEFAULT_DEVELOPMENT_AXIS: [u32; 8] = [12, 24, 36, 48, 60, 72, 84, 96];

/// Days before the limitation deadline at which a claim is flagged as approaching
pub const DEFAULT_APPROACHING_WINDOW_DAYS: i64 = 90;

/// Score cut-offs for executive review levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub watch: u32,
    pub required: u32,
    pub critical: u32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            watch: 15,
            required: 30,
            critical: 50,
        }
    }
}

impl ScoreThresholds {
    /// Thresholds must be strictly increasing for the level step function to be total
    pub fn validate(&self) -> Result<()> {
        if self.watch < self.required && self.required < self.critical {
            Ok(())
        } else {
            Err(AnalyticsError::Configuration(format!(
                "score thresholds must increase: watch={} required={} critical={}",
                self.watch, self.required, self.critical
            )))
        }
    }
}

fn default_axis() -> Vec<u32> {
    DEFAULT_DEVELOPMENT_AXIS.to_vec()
}

fn default_window() -> i64 {
    DEFAULT_APPROACHING_WINDOW_DAYS
}

/// Expense-category markers denoting a large-loss / high-complexity file
pub fn default_large_loss_markers() -> Vec<String> {
    ["LARGE LOSS", "CATASTROPHIC", "L4L", "L5L"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered development months used as the triangle's column axis
    #[serde(default = "default_axis")]
    pub development_axis: Vec<u32>,

    /// Inclusive window (days) for the SOL "approaching" flag
    #[serde(default = "default_window")]
    pub approaching_window_days: i64,

    #[serde(default)]
    pub score_thresholds: ScoreThresholds,

    /// Case-insensitive substrings of the expense category that mark a large loss
    #[serde(default = "default_large_loss_markers")]
    pub large_loss_markers: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            development_axis: default_axis(),
            approaching_window_days: DEFAULT_APPROACHING_WINDOW_DAYS,
            score_thresholds: ScoreThresholds::default(),
            large_loss_markers: default_large_loss_markers(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; absent keys take their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(file)
    }

    /// Load configuration from any JSON reader
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.development_axis.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::Configuration(format!(
                "development axis must be strictly increasing: {:?}",
                self.development_axis
            )));
        }
        if self.approaching_window_days < 0 {
            return Err(AnalyticsError::Configuration(format!(
                "approaching window cannot be negative: {}",
                self.approaching_window_days
            )));
        }
        self.score_thresholds.validate()
    }
}
