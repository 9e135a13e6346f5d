//! Canonical claim record consumed by the SOL evaluator and review scorer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current handling status of a claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    InProgress,
    Settled,
    DecisionsPending,
    /// Any status the source system reports that the engine has no rule for
    Other(String),
}

impl ClaimStatus {
    /// Parse a free-text status, tolerating case, spacing and separators
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "inprogress" | "open" => ClaimStatus::InProgress,
            "settled" | "closed" | "paid" => ClaimStatus::Settled,
            "decisionspending" | "decisionpending" | "pending" => ClaimStatus::DecisionsPending,
            _ => ClaimStatus::Other(raw.trim().to_string()),
        }
    }

    /// Default predicate for SOL views: claims that can still be acted on
    pub fn is_actionable(&self) -> bool {
        matches!(self, ClaimStatus::InProgress | ClaimStatus::DecisionsPending)
    }
}

impl Default for ClaimStatus {
    fn default() -> Self {
        ClaimStatus::Other(String::new())
    }
}

/// Litigation stage as reported by claims handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LitigationStage {
    Early,
    Middle,
    Late,
    VeryLate,
    Unknown,
}

impl LitigationStage {
    /// Parse a stage label ("Very Late", "very_late", "LATE", ...)
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "early" => LitigationStage::Early,
            "middle" | "mid" => LitigationStage::Middle,
            "late" => LitigationStage::Late,
            "verylate" => LitigationStage::VeryLate,
            _ => LitigationStage::Unknown,
        }
    }

    /// Late and Very Late stages count as late litigation
    pub fn is_late(&self) -> bool {
        matches!(self, LitigationStage::Late | LitigationStage::VeryLate)
    }
}

impl Default for LitigationStage {
    fn default() -> Self {
        LitigationStage::Unknown
    }
}

/// A single normalized claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Unique claim identifier
    pub claim_number: String,

    /// Jurisdiction (two-letter state code, upper case)
    pub state: Option<String>,

    /// Date the exposure was created; triggers the limitation period
    pub exposure_create_date: Option<NaiveDate>,

    pub status: ClaimStatus,

    /// Outstanding reserves
    #[serde(default)]
    pub reserves: f64,

    /// Date the claim was transferred into litigation handling
    #[serde(default)]
    pub transfer_date: Option<NaiveDate>,

    #[serde(default)]
    pub litigation_stage: LitigationStage,

    /// Spend on expert witnesses / proactive defence
    #[serde(default)]
    pub expert_spend: f64,

    /// Spend reacting to plaintiff activity
    #[serde(default)]
    pub reactive_spend: f64,

    /// Number of pain-level escalations over the life of the claim
    #[serde(default)]
    pub pain_escalation: u32,

    /// Highest reported pain level (0-10 scale)
    #[serde(default)]
    pub max_pain: u32,

    #[serde(default)]
    pub expense_category: String,
}

impl ClaimRecord {
    /// Create a claim with identifying fields only; everything else neutral
    pub fn new(claim_number: impl Into<String>) -> Self {
        Self {
            claim_number: claim_number.into(),
            state: None,
            exposure_create_date: None,
            status: ClaimStatus::default(),
            reserves: 0.0,
            transfer_date: None,
            litigation_stage: LitigationStage::Unknown,
            expert_spend: 0.0,
            reactive_spend: 0.0,
            pain_escalation: 0,
            max_pain: 0,
            expense_category: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(ClaimStatus::parse("In Progress"), ClaimStatus::InProgress);
        assert_eq!(ClaimStatus::parse("in_progress"), ClaimStatus::InProgress);
        assert_eq!(ClaimStatus::parse("SETTLED"), ClaimStatus::Settled);
        assert_eq!(ClaimStatus::parse("Decisions Pending"), ClaimStatus::DecisionsPending);
        assert_eq!(
            ClaimStatus::parse(" Reopened "),
            ClaimStatus::Other("Reopened".to_string())
        );
    }

    #[test]
    fn test_actionable_statuses() {
        assert!(ClaimStatus::InProgress.is_actionable());
        assert!(ClaimStatus::DecisionsPending.is_actionable());
        assert!(!ClaimStatus::Settled.is_actionable());
        assert!(!ClaimStatus::Other("Reopened".into()).is_actionable());
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(LitigationStage::parse("Very Late"), LitigationStage::VeryLate);
        assert_eq!(LitigationStage::parse("very_late"), LitigationStage::VeryLate);
        assert_eq!(LitigationStage::parse("LATE"), LitigationStage::Late);
        assert_eq!(LitigationStage::parse(""), LitigationStage::Unknown);
        assert!(LitigationStage::VeryLate.is_late());
        assert!(!LitigationStage::Early.is_late());
    }
}
