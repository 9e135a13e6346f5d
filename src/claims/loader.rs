//! Load claims from spreadsheet-style CSV exports
//!
//! Column names drift between exports ("Claim Number", "ClaimNumber", "Claim #").
//! Every optional or renamed column is absorbed here so the evaluators only ever
//! see a [`ClaimRecord`].

use super::{ClaimRecord, ClaimStatus, LitigationStage};
use crate::error::{is_row_error, AnalyticsError, BatchOutcome, Result};
use chrono::NaiveDate;
use csv::Reader;
use std::path::Path;

/// Date formats accepted from exports, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Raw CSV row; every column is optional
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "ClaimNumber", alias = "Claim Number", alias = "Claim #", alias = "claim_number")]
    claim_number: Option<String>,
    #[serde(rename = "State", alias = "Jurisdiction", alias = "state")]
    state: Option<String>,
    #[serde(rename = "ExposureCreateDate", alias = "Exposure Create Date", alias = "exposure_create_date")]
    exposure_create_date: Option<String>,
    #[serde(rename = "Status", alias = "Claim Status", alias = "status")]
    status: Option<String>,
    #[serde(rename = "Reserves", alias = "Total Reserves", alias = "reserves")]
    reserves: Option<String>,
    #[serde(rename = "TransferDate", alias = "Transfer Date", alias = "transfer_date")]
    transfer_date: Option<String>,
    #[serde(rename = "LitigationStage", alias = "Stage", alias = "litigation_stage")]
    litigation_stage: Option<String>,
    #[serde(rename = "ExpertSpend", alias = "Expert Spend", alias = "expert_spend")]
    expert_spend: Option<String>,
    #[serde(rename = "ReactiveSpend", alias = "Reactive Spend", alias = "reactive_spend")]
    reactive_spend: Option<String>,
    #[serde(rename = "PainEscalation", alias = "Pain Escalation", alias = "pain_escalation")]
    pain_escalation: Option<String>,
    #[serde(rename = "MaxPain", alias = "Max Pain", alias = "max_pain")]
    max_pain: Option<String>,
    #[serde(rename = "ExpenseCategory", alias = "Expense Category", alias = "expense_category")]
    expense_category: Option<String>,
}

/// Treat blank cells as absent
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a date in any of the accepted export formats
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_date_field(value: Option<String>, field: &'static str) -> Result<Option<NaiveDate>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or(AnalyticsError::InvalidField { field, value: raw }),
    }
}

/// Parse a currency-formatted amount ("$15,000.00", "(1,200)")
fn parse_amount(value: Option<String>, field: &'static str) -> Result<f64> {
    let Some(raw) = present(value) else {
        return Ok(0.0);
    };

    let (negative, inner) = match raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, raw.as_str()),
    };
    let cleaned: String = inner
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let amount = cleaned
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| AnalyticsError::InvalidField { field, value: raw.clone() })?;

    Ok(if negative { -amount } else { amount })
}

fn parse_count(value: Option<String>, field: &'static str) -> Result<u32> {
    let Some(raw) = present(value) else {
        return Ok(0);
    };

    // Spreadsheet exports often render integers as "4.0"
    raw.parse::<u32>()
        .or_else(|_| raw.parse::<f64>().map(|f| f.max(0.0).round() as u32))
        .map_err(|_| AnalyticsError::InvalidField { field, value: raw })
}

impl CsvRow {
    fn to_claim(self) -> Result<ClaimRecord> {
        let claim_number = present(self.claim_number).ok_or(AnalyticsError::DataGap {
            unit: "claim row".to_string(),
            field: "claim_number",
        })?;

        Ok(ClaimRecord {
            claim_number,
            state: present(self.state).map(|s| s.to_ascii_uppercase()),
            exposure_create_date: parse_date_field(self.exposure_create_date, "exposure_create_date")?,
            status: present(self.status)
                .map(|s| ClaimStatus::parse(&s))
                .unwrap_or_default(),
            reserves: parse_amount(self.reserves, "reserves")?,
            transfer_date: parse_date_field(self.transfer_date, "transfer_date")?,
            litigation_stage: present(self.litigation_stage)
                .map(|s| LitigationStage::parse(&s))
                .unwrap_or_default(),
            expert_spend: parse_amount(self.expert_spend, "expert_spend")?,
            reactive_spend: parse_amount(self.reactive_spend, "reactive_spend")?,
            pain_escalation: parse_count(self.pain_escalation, "pain_escalation")?,
            max_pain: parse_count(self.max_pain, "max_pain")?,
            expense_category: present(self.expense_category).unwrap_or_default(),
        })
    }
}

/// Load all claims from a CSV file
///
/// Rows that cannot be interpreted are excluded and reported as failures keyed
/// by claim number (or `row N` when the claim number is missing). Only
/// file-level CSV and I/O errors are returned as `Err`.
pub fn load_claims<P: AsRef<Path>>(path: P) -> Result<BatchOutcome<ClaimRecord>> {
    let reader = Reader::from_path(path)?;
    read_claims(reader)
}

/// Load claims from any reader (e.g., string buffer, network stream)
pub fn load_claims_from_reader<R: std::io::Read>(reader: R) -> Result<BatchOutcome<ClaimRecord>> {
    read_claims(Reader::from_reader(reader))
}

fn read_claims<R: std::io::Read>(mut reader: Reader<R>) -> Result<BatchOutcome<ClaimRecord>> {
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_id = format!("row {}", index + 1);
        match result {
            Ok(row) => {
                let unit = present(row.claim_number.clone()).unwrap_or(row_id);
                rows.push((unit, row.to_claim()));
            }
            Err(e) if is_row_error(&e) => rows.push((row_id, Err(e.into()))),
            Err(e) => return Err(e.into()),
        }
    }

    let outcome = BatchOutcome::from_results(rows);
    log::debug!(
        "Loaded {} claims, {} rows excluded",
        outcome.results.len(),
        outcome.excluded_count()
    );
    Ok(outcome)
}
