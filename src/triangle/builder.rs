//! Development triangle construction
//!
//! The triangle is sparse: a cell exists only if a point was supplied for it.
//! Missing cells are never zero-filled or interpolated.

use super::points::{MetricPoint, MetricType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// A cell that was supplied more than once; the later value was kept
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuplicateCell {
    pub accident_year: i32,
    pub development_months: u32,
    pub discarded: f64,
    pub kept: f64,
}

/// A point that could not be placed in the triangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkippedPoint {
    pub accident_year: i32,
    pub development_months: u32,
    pub amount: f64,
}

/// A decrease between two observed ages of a monotone metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonotonicityViolation {
    pub accident_year: i32,
    pub from_month: u32,
    pub to_month: u32,
    pub from_value: f64,
    pub to_value: f64,
}

/// Most recent observed cell for an accident year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestCell {
    pub accident_year: i32,
    pub development_months: u32,
    pub amount: f64,
}

/// Accident year × development month matrix for a single metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    pub metric_type: MetricType,

    /// accident_year -> (development_months -> amount), both ascending
    cells: BTreeMap<i32, BTreeMap<u32, f64>>,

    /// Overwritten cells, in the order they were encountered
    pub duplicates: Vec<DuplicateCell>,

    /// Points dropped because their amount was not finite
    pub skipped: Vec<SkippedPoint>,
}

impl Triangle {
    /// Empty triangle for a metric
    pub fn new(metric_type: MetricType) -> Self {
        Self {
            metric_type,
            cells: BTreeMap::new(),
            duplicates: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Set a cell; last write wins and the overwritten value is recorded
    pub fn insert(&mut self, accident_year: i32, development_months: u32, amount: f64) {
        let row = self.cells.entry(accident_year).or_default();
        match row.entry(development_months) {
            Entry::Vacant(slot) => {
                slot.insert(amount);
            }
            Entry::Occupied(mut slot) => {
                let discarded = slot.insert(amount);
                log::warn!(
                    "Duplicate {} cell for AY {} at {} months: {} replaced by {}",
                    self.metric_type, accident_year, development_months, discarded, amount
                );
                self.duplicates.push(DuplicateCell {
                    accident_year,
                    development_months,
                    discarded,
                    kept: amount,
                });
            }
        }
    }

    /// Accident years present, ascending
    pub fn years(&self) -> Vec<i32> {
        self.cells.keys().copied().collect()
    }

    /// Value at (year, month), if observed
    pub fn value(&self, accident_year: i32, development_months: u32) -> Option<f64> {
        self.cells
            .get(&accident_year)
            .and_then(|row| row.get(&development_months))
            .copied()
    }

    /// All observed cells for one accident year
    pub fn row(&self, accident_year: i32) -> Option<&BTreeMap<u32, f64>> {
        self.cells.get(&accident_year)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(|row| row.len()).sum()
    }

    /// Latest observed development age per accident year
    pub fn latest_diagonal(&self) -> Vec<LatestCell> {
        self.cells
            .iter()
            .filter_map(|(&year, row)| {
                row.iter().next_back().map(|(&month, &amount)| LatestCell {
                    accident_year: year,
                    development_months: month,
                    amount,
                })
            })
            .collect()
    }

    /// Decreases between consecutive observed ages, for monotone metrics only
    ///
    /// This is a validation signal: the triangle itself is left untouched.
    pub fn monotonicity_violations(&self) -> Vec<MonotonicityViolation> {
        if !self.metric_type.is_monotone() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (&year, row) in &self.cells {
            let observed: Vec<(u32, f64)> = row.iter().map(|(&m, &v)| (m, v)).collect();
            for pair in observed.windows(2) {
                let (from_month, from_value) = pair[0];
                let (to_month, to_value) = pair[1];
                if to_value < from_value {
                    violations.push(MonotonicityViolation {
                        accident_year: year,
                        from_month,
                        to_month,
                        from_value,
                        to_value,
                    });
                }
            }
        }
        violations
    }
}

/// Build a triangle for one metric from a stream of points
///
/// Points for other metrics are ignored. Duplicate (year, month) keys resolve
/// last-write-wins in input order; each is logged and recorded on the result.
/// Non-finite amounts are dropped as data gaps and recorded in `skipped`.
pub fn build_triangle<'a, I>(points: I, metric_type: MetricType) -> Triangle
where
    I: IntoIterator<Item = &'a MetricPoint>,
{
    let mut triangle = Triangle::new(metric_type);

    for point in points.into_iter().filter(|p| p.metric_type == metric_type) {
        if !point.amount.is_finite() {
            log::warn!(
                "Skipping non-finite {} amount for AY {} at {} months",
                metric_type, point.accident_year, point.development_months
            );
            triangle.skipped.push(SkippedPoint {
                accident_year: point.accident_year,
                development_months: point.development_months,
                amount: point.amount,
            });
            continue;
        }
        triangle.insert(point.accident_year, point.development_months, point.amount);
    }

    log::debug!(
        "Built {} triangle: {} years, {} cells, {} duplicates, {} skipped",
        metric_type,
        triangle.cells.len(),
        triangle.cell_count(),
        triangle.duplicates.len(),
        triangle.skipped.len()
    );

    triangle
}
