//! Error taxonomy for the analytics engine
//!
//! Two classes matter to callers:
//! - **Soft** failures (`DataGap`): a cell or field is missing. The affected unit
//!   reports "nothing computable" instead of a fabricated value.
//! - **Hard** failures (`Configuration`): the engine cannot proceed safely for
//!   that unit, e.g. a claim in a jurisdiction with no limitation period on file.
//!
//! Division by zero in link ratios is not represented here at all; it is an
//! expected case and is handled by exclusion from the averages.

use serde::Serialize;

/// Errors raised by loaders and per-unit evaluators
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// A required field or cell is absent for one unit
    #[error("data gap in {unit}: missing {field}")]
    DataGap { unit: String, field: &'static str },

    /// Configuration cannot support the requested evaluation
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A field was present but could not be interpreted
    #[error("invalid {field} value '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// Convenience constructor for a missing field on a named unit
    pub fn data_gap(unit: impl Into<String>, field: &'static str) -> Self {
        AnalyticsError::DataGap {
            unit: unit.into(),
            field,
        }
    }

    /// Whether the failure is soft (missing data) rather than a hard stop
    pub fn is_soft(&self) -> bool {
        matches!(self, AnalyticsError::DataGap { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Whether a CSV error affects only the current record rather than the whole file
pub(crate) fn is_row_error(error: &csv::Error) -> bool {
    matches!(
        error.kind(),
        csv::ErrorKind::Deserialize { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}

/// A single unit (claim, accident year) that was excluded from a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    /// Claim number or other unit identifier
    pub unit_id: String,

    /// Rendered error message
    pub reason: String,

    /// True when the failure was a data gap rather than a hard error
    pub soft: bool,
}

impl UnitFailure {
    pub fn new(unit_id: impl Into<String>, error: &AnalyticsError) -> Self {
        Self {
            unit_id: unit_id.into(),
            reason: error.to_string(),
            soft: error.is_soft(),
        }
    }
}

/// Partial result of a batch run: everything that succeeded plus what did not
///
/// A failing unit never aborts the batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome<T> {
    pub results: Vec<T>,
    pub failures: Vec<UnitFailure>,
}

impl<T> BatchOutcome<T> {
    /// Split a sequence of per-unit results into successes and failures,
    /// preserving input order within each list
    pub fn from_results<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, Result<T>)>,
    {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for (unit_id, outcome) in outcomes {
            match outcome {
                Ok(value) => results.push(value),
                Err(e) => {
                    log::warn!("Excluding {} from batch: {}", unit_id, e);
                    failures.push(UnitFailure::new(unit_id, &e));
                }
            }
        }

        Self { results, failures }
    }

    /// Batch with no failures
    pub fn complete(results: Vec<T>) -> Self {
        Self {
            results,
            failures: Vec::new(),
        }
    }

    /// Carry failures from an earlier stage (e.g. loading) ahead of this batch's own
    pub fn with_prior_failures(mut self, prior: &[UnitFailure]) -> Self {
        let mut failures = prior.to_vec();
        failures.append(&mut self.failures);
        self.failures = failures;
        self
    }

    /// Number of units excluded from `results`
    pub fn excluded_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every unit evaluated successfully
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_keeps_order_and_failures() {
        let outcome = BatchOutcome::from_results(vec![
            ("A".to_string(), Ok(1)),
            ("B".to_string(), Err(AnalyticsError::Configuration("no limit for ZZ".into()))),
            ("C".to_string(), Ok(3)),
            ("D".to_string(), Err(AnalyticsError::data_gap("D", "exposure_create_date"))),
        ]);

        assert_eq!(outcome.results, vec![1, 3]);
        assert_eq!(outcome.excluded_count(), 2);
        assert_eq!(outcome.failures[0].unit_id, "B");
        assert!(!outcome.failures[0].soft);
        assert!(outcome.failures[1].soft);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_prior_failures_come_first() {
        let loaded: BatchOutcome<u32> = BatchOutcome::from_results(vec![
            ("row 2".to_string(), Err(AnalyticsError::data_gap("claim row", "claim_number"))),
        ]);
        let evaluated = BatchOutcome::from_results(vec![
            ("A".to_string(), Ok(1)),
            ("B".to_string(), Err(AnalyticsError::Configuration("no limit for ZZ".into()))),
        ])
        .with_prior_failures(&loaded.failures);

        assert_eq!(evaluated.results, vec![1]);
        assert_eq!(evaluated.excluded_count(), 2);
        assert_eq!(evaluated.failures[0].unit_id, "row 2");
        assert_eq!(evaluated.failures[1].unit_id, "B");
        assert!(BatchOutcome::complete(vec![1, 2]).is_complete());
    }

    #[test]
    fn test_data_gap_message() {
        let err = AnalyticsError::data_gap("CLM-1", "state");
        assert_eq!(err.to_string(), "data gap in CLM-1: missing state");
        assert!(err.is_soft());
    }
}
