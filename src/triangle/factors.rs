//! Age-to-age and cumulative development factors
//!
//! Chain-ladder mechanics over a [`Triangle`]:
//! 1. Link ratios per accident year for each consecutive pair of axis periods
//! 2. Simple and volume-weighted averages of those ratios
//! 3. Selected factor per period: weighted, else simple, else 1.000 (tagged unsupported)
//! 4. Suffix products of the selected factors give development-to-ultimate factors,
//!    with development beyond the last axis period assumed complete (tail = 1.000)

use super::builder::Triangle;
use super::points::MetricType;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum decimals used when factors are rendered for reporting
pub const FACTOR_DECIMALS: usize = 4;

/// Factor applied when no accident year supports a link ratio
pub const NO_DEVELOPMENT: f64 = 1.0;

/// Link ratios between two development periods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeToAgeFactor {
    pub from_month: u32,
    pub to_month: u32,

    /// Every accident year in the triangle; `None` where no ratio is computable
    pub per_year: BTreeMap<i32, Option<f64>>,

    /// Arithmetic mean of the defined ratios
    pub simple_avg: Option<f64>,

    /// Σ(ratio × from_value) / Σ(from_value) over the defined ratios
    pub weighted_avg: Option<f64>,
}

impl AgeToAgeFactor {
    /// Number of accident years contributing a defined ratio
    pub fn observed_years(&self) -> usize {
        self.per_year.values().filter(|f| f.is_some()).count()
    }
}

/// Where a selected factor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorBasis {
    /// Volume-weighted average of observed ratios
    Weighted,
    /// Simple average; the weighted average was not computable
    Simple,
    /// No observed ratios; placeholder of 1.000
    Unsupported,
}

impl FactorBasis {
    pub fn is_observed(&self) -> bool {
        !matches!(self, FactorBasis::Unsupported)
    }
}

impl fmt::Display for FactorBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FactorBasis::Weighted => "weighted",
            FactorBasis::Simple => "simple",
            FactorBasis::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

/// Selected age-to-age factor for one period, tagged with its basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectedFactor {
    pub from_month: u32,
    pub to_month: u32,
    pub value: f64,
    pub basis: FactorBasis,
}

impl fmt::Display for SelectedFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: {:.*} ({})",
            self.from_month, self.to_month, FACTOR_DECIMALS, self.value, self.basis
        )
    }
}

/// Cumulative development factor at one axis period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CdfEntry {
    pub development_months: u32,
    pub factor: f64,

    /// True when any factor in the product was an unsupported placeholder
    pub includes_unsupported: bool,
}

/// Compute link ratios for each consecutive pair of axis periods
///
/// A year's ratio is defined only when both cells exist and the `from` cell is
/// non-zero. Years without a defined ratio are excluded from both averages.
/// Fewer than two accident years yields no factors.
pub fn compute_age_to_age(triangle: &Triangle, axis: &[u32]) -> Vec<AgeToAgeFactor> {
    let years = triangle.years();
    if years.len() < 2 {
        log::debug!(
            "{} triangle has {} accident year(s); no link ratios computable",
            triangle.metric_type,
            years.len()
        );
        return Vec::new();
    }

    axis.windows(2)
        .map(|pair| {
            let (from_month, to_month) = (pair[0], pair[1]);
            let mut per_year = BTreeMap::new();
            let mut ratio_sum = 0.0;
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            let mut defined = 0usize;

            for &year in &years {
                let from = triangle.value(year, from_month);
                let to = triangle.value(year, to_month);

                let factor = match (from, to) {
                    (Some(from_value), Some(to_value)) if from_value != 0.0 => {
                        let factor = to_value / from_value;
                        ratio_sum += factor;
                        weighted_sum += factor * from_value;
                        weight_total += from_value;
                        defined += 1;
                        Some(factor)
                    }
                    _ => None,
                };
                per_year.insert(year, factor);
            }

            let simple_avg = (defined > 0).then(|| ratio_sum / defined as f64);
            let weighted_avg = (defined > 0 && weight_total != 0.0).then(|| weighted_sum / weight_total);

            if defined == 0 {
                log::debug!(
                    "No {} link ratio computable for {}-{} months",
                    triangle.metric_type, from_month, to_month
                );
            }

            AgeToAgeFactor {
                from_month,
                to_month,
                per_year,
                simple_avg,
                weighted_avg,
            }
        })
        .collect()
}

/// Select one factor per period: weighted, else simple, else 1.000
pub fn select_ata(factors: &[AgeToAgeFactor]) -> Vec<SelectedFactor> {
    factors
        .iter()
        .map(|f| {
            let (value, basis) = match (f.weighted_avg, f.simple_avg) {
                (Some(w), _) => (w, FactorBasis::Weighted),
                (None, Some(s)) => (s, FactorBasis::Simple),
                (None, None) => (NO_DEVELOPMENT, FactorBasis::Unsupported),
            };
            SelectedFactor {
                from_month: f.from_month,
                to_month: f.to_month,
                value,
                basis,
            }
        })
        .collect()
}

/// Suffix products of the selected factors, followed by a 1.000 tail
///
/// `result[i] = Π selected[i..]` and `result[len] = 1.0`. Empty input gives an
/// empty result.
pub fn cumulative_to_ultimate(selected: &[f64]) -> Vec<f64> {
    if selected.is_empty() {
        return Vec::new();
    }

    let mut cdf = vec![NO_DEVELOPMENT; selected.len() + 1];
    for i in (0..selected.len()).rev() {
        cdf[i] = cdf[i + 1] * selected[i];
    }
    cdf
}

/// Projected ultimate value for one accident year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UltimateProjection {
    pub accident_year: i32,
    pub latest_months: u32,
    pub latest_amount: f64,

    /// CDF at the latest age; `None` when that age is not on the axis
    pub cdf: Option<f64>,
    pub ultimate: Option<f64>,
}

/// Full development analysis for one triangle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevelopmentReport {
    pub metric_type: MetricType,
    pub axis: Vec<u32>,
    pub age_to_age: Vec<AgeToAgeFactor>,
    pub selected: Vec<SelectedFactor>,
    pub cdf: Vec<CdfEntry>,
}

impl DevelopmentReport {
    /// CDF at a development age, if that age is on the axis
    pub fn cdf_at(&self, development_months: u32) -> Option<f64> {
        self.cdf
            .iter()
            .find(|e| e.development_months == development_months)
            .map(|e| e.factor)
    }

    /// Number of periods whose selected factor is a placeholder
    pub fn unsupported_periods(&self) -> usize {
        self.selected.iter().filter(|s| !s.basis.is_observed()).count()
    }

    /// Latest diagonal developed to ultimate
    pub fn projected_ultimates(&self, triangle: &Triangle) -> Vec<UltimateProjection> {
        triangle
            .latest_diagonal()
            .into_iter()
            .map(|cell| {
                let cdf = self.cdf_at(cell.development_months);
                UltimateProjection {
                    accident_year: cell.accident_year,
                    latest_months: cell.development_months,
                    latest_amount: cell.amount,
                    cdf,
                    ultimate: cdf.map(|f| f * cell.amount),
                }
            })
            .collect()
    }
}

/// Run link ratios, selection and cumulative factors in one pass
pub fn develop(triangle: &Triangle, axis: &[u32]) -> DevelopmentReport {
    let age_to_age = compute_age_to_age(triangle, axis);
    let selected = select_ata(&age_to_age);
    let values: Vec<f64> = selected.iter().map(|s| s.value).collect();
    let products = cumulative_to_ultimate(&values);

    // Whether any placeholder sits at or after position i
    let mut unsupported_suffix = vec![false; products.len()];
    for i in (0..selected.len()).rev() {
        unsupported_suffix[i] = unsupported_suffix[i + 1] || !selected[i].basis.is_observed();
    }

    let cdf = products
        .iter()
        .zip(axis.iter())
        .zip(unsupported_suffix)
        .map(|((&factor, &development_months), includes_unsupported)| CdfEntry {
            development_months,
            factor,
            includes_unsupported,
        })
        .collect();

    DevelopmentReport {
        metric_type: triangle.metric_type,
        axis: axis.to_vec(),
        age_to_age,
        selected,
        cdf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::{build_triangle, MetricPoint};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const AXIS: [u32; 4] = [12, 24, 36, 48];

    fn triangle_from(cells: &[(i32, u32, f64)]) -> Triangle {
        let points: Vec<MetricPoint> = cells
            .iter()
            .map(|&(y, m, a)| MetricPoint::new(y, m, MetricType::LossRatio, a))
            .collect();
        build_triangle(&points, MetricType::LossRatio)
    }

    fn sample_triangle() -> Triangle {
        triangle_from(&[
            (2019, 12, 100.0),
            (2019, 24, 150.0),
            (2019, 36, 165.0),
            (2020, 12, 200.0),
            (2020, 24, 260.0),
            (2021, 12, 50.0),
        ])
    }

    #[test]
    fn test_age_to_age_averages() {
        let factors = compute_age_to_age(&sample_triangle(), &AXIS);
        assert_eq!(factors.len(), 3);

        let first = &factors[0];
        assert_eq!((first.from_month, first.to_month), (12, 24));
        assert_relative_eq!(first.per_year[&2019].unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(first.per_year[&2020].unwrap(), 1.3, epsilon = 1e-12);
        assert_eq!(first.per_year[&2021], None);
        assert_relative_eq!(first.simple_avg.unwrap(), 1.4, epsilon = 1e-12);
        // (150 + 260) / (100 + 200)
        assert_relative_eq!(first.weighted_avg.unwrap(), 410.0 / 300.0, epsilon = 1e-12);
        assert_eq!(first.observed_years(), 2);

        let second = &factors[1];
        assert_relative_eq!(second.simple_avg.unwrap(), 1.1, epsilon = 1e-12);
        assert_relative_eq!(second.weighted_avg.unwrap(), 1.1, epsilon = 1e-12);

        let third = &factors[2];
        assert_eq!(third.simple_avg, None);
        assert_eq!(third.weighted_avg, None);
    }

    #[test]
    fn test_weighted_differs_from_simple() {
        // Small year with a noisy ratio barely moves the weighted average
        let triangle = triangle_from(&[
            (2019, 12, 1_000.0),
            (2019, 24, 1_100.0),
            (2020, 12, 10.0),
            (2020, 24, 30.0),
        ]);
        let factors = compute_age_to_age(&triangle, &[12, 24]);
        assert_relative_eq!(factors[0].simple_avg.unwrap(), 2.05, epsilon = 1e-12);
        assert_relative_eq!(factors[0].weighted_avg.unwrap(), 1_130.0 / 1_010.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_from_value_excluded() {
        let triangle = triangle_from(&[
            (2019, 12, 100.0),
            (2019, 24, 120.0),
            (2020, 12, 0.0),
            (2020, 24, 40.0),
        ]);
        let factors = compute_age_to_age(&triangle, &[12, 24]);

        assert_eq!(factors[0].per_year[&2020], None);
        assert_relative_eq!(factors[0].simple_avg.unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(factors[0].weighted_avg.unwrap(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_single_year_produces_nothing() {
        let triangle = triangle_from(&[(2020, 12, 100.0), (2020, 24, 130.0)]);
        let report = develop(&triangle, &AXIS);
        assert!(report.age_to_age.is_empty());
        assert!(report.selected.is_empty());
        assert!(report.cdf.is_empty());
    }

    #[test]
    fn test_select_fallback_chain() {
        let factors = compute_age_to_age(&sample_triangle(), &AXIS);
        let selected = select_ata(&factors);

        assert_eq!(selected[0].basis, FactorBasis::Weighted);
        assert_relative_eq!(selected[0].value, 410.0 / 300.0, epsilon = 1e-12);
        assert_eq!(selected[2].basis, FactorBasis::Unsupported);
        assert_eq!(selected[2].value, 1.0);

        let simple_only = AgeToAgeFactor {
            from_month: 12,
            to_month: 24,
            per_year: BTreeMap::new(),
            simple_avg: Some(1.25),
            weighted_avg: None,
        };
        let selected = select_ata(&[simple_only]);
        assert_eq!(selected[0].basis, FactorBasis::Simple);
        assert_eq!(selected[0].value, 1.25);
    }

    #[test]
    fn test_cumulative_to_ultimate() {
        let cdf = cumulative_to_ultimate(&[1.5, 1.2, 1.1]);
        assert_eq!(cdf.len(), 4);
        assert_relative_eq!(cdf[0], 1.98, epsilon = 1e-12);
        assert_relative_eq!(cdf[1], 1.32, epsilon = 1e-12);
        assert_relative_eq!(cdf[2], 1.1, epsilon = 1e-12);
        assert_eq!(cdf[3], 1.0);

        assert!(cumulative_to_ultimate(&[]).is_empty());
    }

    #[test]
    fn test_develop_aligns_cdf_with_axis() {
        let triangle = sample_triangle();
        let report = develop(&triangle, &AXIS);

        assert_eq!(report.cdf.len(), AXIS.len());
        assert_eq!(report.cdf[0].development_months, 12);
        assert_relative_eq!(report.cdf[0].factor, (410.0 / 300.0) * 1.1, epsilon = 1e-12);
        assert!(report.cdf[0].includes_unsupported);
        assert_eq!(report.cdf[3].development_months, 48);
        assert_eq!(report.cdf[3].factor, 1.0);
        assert!(!report.cdf[3].includes_unsupported);
        assert_eq!(report.unsupported_periods(), 1);
    }

    #[test]
    fn test_projected_ultimates() {
        let triangle = sample_triangle();
        let report = develop(&triangle, &AXIS);
        let ultimates = report.projected_ultimates(&triangle);

        assert_eq!(ultimates.len(), 3);
        // 2020 latest at 24 months: 260 × 1.1
        assert_relative_eq!(ultimates[1].ultimate.unwrap(), 286.0, epsilon = 1e-9);
        // 2019 latest at 36 months: 165 × 1.0
        assert_relative_eq!(ultimates[0].ultimate.unwrap(), 165.0, epsilon = 1e-9);
    }

    #[test]
    fn test_selected_factor_display_has_four_decimals() {
        let s = SelectedFactor {
            from_month: 12,
            to_month: 24,
            value: 1.0,
            basis: FactorBasis::Unsupported,
        };
        assert_eq!(s.to_string(), "12-24: 1.0000 (unsupported)");
    }

    proptest! {
        #[test]
        fn prop_weighted_avg_within_factor_bounds(
            cells in prop::collection::vec((1.0f64..10_000.0, 1.0f64..20_000.0), 2..8)
        ) {
            let mut points = Vec::new();
            for (i, (from, to)) in cells.iter().enumerate() {
                let year = 2010 + i as i32;
                points.push(MetricPoint::new(year, 12, MetricType::LossRatio, *from));
                points.push(MetricPoint::new(year, 24, MetricType::LossRatio, *to));
            }
            let triangle = build_triangle(&points, MetricType::LossRatio);
            let factors = compute_age_to_age(&triangle, &[12, 24]);

            let ratios: Vec<f64> = factors[0].per_year.values().filter_map(|f| *f).collect();
            let min = ratios.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = ratios.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let weighted = factors[0].weighted_avg.unwrap();

            prop_assert!(weighted >= min - 1e-9 && weighted <= max + 1e-9);
        }

        #[test]
        fn prop_select_is_deterministic_and_tail_is_one(
            cells in prop::collection::vec((0.0f64..500.0, 0.0f64..900.0, 0.0f64..1_200.0), 2..6)
        ) {
            let mut points = Vec::new();
            for (i, (a, b, c)) in cells.iter().enumerate() {
                let year = 2015 + i as i32;
                points.push(MetricPoint::new(year, 12, MetricType::LossRatio, *a));
                points.push(MetricPoint::new(year, 24, MetricType::LossRatio, *b));
                points.push(MetricPoint::new(year, 36, MetricType::LossRatio, *c));
            }
            let triangle = build_triangle(&points, MetricType::LossRatio);
            let factors = compute_age_to_age(&triangle, &[12, 24, 36, 48]);

            prop_assert_eq!(select_ata(&factors), select_ata(&factors));

            let values: Vec<f64> = select_ata(&factors).iter().map(|s| s.value).collect();
            let cdf = cumulative_to_ultimate(&values);
            prop_assert_eq!(cdf.last().copied(), Some(1.0));
        }
    }
}
