//! Load metric points from CSV
//!
//! Expected columns: `accident_year,development_months,metric_type,amount`

use super::points::{MetricPoint, MetricType};
use crate::error::{is_row_error, AnalyticsError, BatchOutcome, Result};
use csv::Reader;
use std::path::Path;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(alias = "AccidentYear")]
    accident_year: i32,
    #[serde(alias = "DevelopmentMonths", alias = "dev_months")]
    development_months: u32,
    #[serde(alias = "MetricType", alias = "metric")]
    metric_type: String,
    #[serde(alias = "Amount", alias = "value")]
    amount: f64,
}

impl CsvRow {
    fn to_point(self) -> Result<MetricPoint> {
        let metric_type = MetricType::parse(&self.metric_type).ok_or(AnalyticsError::InvalidField {
            field: "metric_type",
            value: self.metric_type.clone(),
        })?;

        Ok(MetricPoint::new(
            self.accident_year,
            self.development_months,
            metric_type,
            self.amount,
        ))
    }
}

/// Load all metric points from a CSV file
///
/// Unreadable rows are excluded and reported as `row N` failures.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<BatchOutcome<MetricPoint>> {
    let reader = Reader::from_path(path)?;
    read_points(reader)
}

/// Load metric points from any reader
pub fn load_points_from_reader<R: std::io::Read>(reader: R) -> Result<BatchOutcome<MetricPoint>> {
    read_points(Reader::from_reader(reader))
}

fn read_points<R: std::io::Read>(mut reader: Reader<R>) -> Result<BatchOutcome<MetricPoint>> {
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_id = format!("row {}", index + 1);
        match result {
            Ok(row) => rows.push((row_id, row.to_point())),
            Err(e) if is_row_error(&e) => rows.push((row_id, Err(e.into()))),
            Err(e) => return Err(e.into()),
        }
    }

    let outcome = BatchOutcome::from_results(rows);
    log::debug!(
        "Loaded {} metric points, {} rows excluded",
        outcome.results.len(),
        outcome.excluded_count()
    );
    Ok(outcome)
}
