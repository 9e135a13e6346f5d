//! Raw metric points feeding the development triangle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial metric carried by a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    LossRatio,
    NetPaidLoss,
    EarnedPremium,
    ClaimReserves,
    BulkIbnr,
    GrossPaid,
}

impl MetricType {
    pub const ALL: [MetricType; 6] = [
        MetricType::LossRatio,
        MetricType::NetPaidLoss,
        MetricType::EarnedPremium,
        MetricType::ClaimReserves,
        MetricType::BulkIbnr,
        MetricType::GrossPaid,
    ];

    /// Cumulative paid metrics never decrease with development age
    pub fn is_monotone(&self) -> bool {
        matches!(self, MetricType::NetPaidLoss | MetricType::GrossPaid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::LossRatio => "loss_ratio",
            MetricType::NetPaidLoss => "net_paid_loss",
            MetricType::EarnedPremium => "earned_premium",
            MetricType::ClaimReserves => "claim_reserves",
            MetricType::BulkIbnr => "bulk_ibnr",
            MetricType::GrossPaid => "gross_paid",
        }
    }

    /// Parse the snake_case name used in exports
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        MetricType::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation: a metric for an accident year at a development age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub accident_year: i32,
    pub development_months: u32,
    pub metric_type: MetricType,
    pub amount: f64,
}

impl MetricPoint {
    pub fn new(accident_year: i32, development_months: u32, metric_type: MetricType, amount: f64) -> Self {
        Self {
            accident_year,
            development_months,
            metric_type,
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_names() {
        for metric in MetricType::ALL {
            assert_eq!(MetricType::parse(metric.as_str()), Some(metric));
        }
        assert_eq!(MetricType::parse(" Loss_Ratio "), Some(MetricType::LossRatio));
        assert_eq!(MetricType::parse("incurred"), None);
    }

    #[test]
    fn test_monotone_metrics() {
        assert!(MetricType::GrossPaid.is_monotone());
        assert!(MetricType::NetPaidLoss.is_monotone());
        assert!(!MetricType::LossRatio.is_monotone());
        assert!(!MetricType::ClaimReserves.is_monotone());
    }
}
