//! Per-step output records and the ordered table they form.
//!
//! RULE: Field names of `TimeSeriesRecord` are an external contract.
//! Metric extraction and CSV export both key on them, so the serialised
//! names and `COLUMNS` order never change.

use crate::types::Years;
use serde::{Deserialize, Serialize};

/// Column names in export order.
pub const COLUMNS: [&str; 12] = [
    "time",
    "K_ai",
    "Labor_U",
    "unemployment_rate",
    "labor_force",
    "Stability",
    "Public_Pool",
    "tax_rate",
    "output",
    "Environment",
    "Resources",
    "resource_cost_multiplier",
];

/// Full derived state after one step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesRecord {
    pub time:                     Years,
    #[serde(rename = "K_ai")]
    pub k_ai:                     f64,
    #[serde(rename = "Labor_U")]
    pub labor_u:                  f64,
    pub unemployment_rate:        f64,
    pub labor_force:              f64,
    #[serde(rename = "Stability")]
    pub stability:                f64,
    #[serde(rename = "Public_Pool")]
    pub public_pool:              f64,
    pub tax_rate:                 f64,
    /// Effective output: after the environment penalty and scarcity cost.
    pub output:                   f64,
    #[serde(rename = "Environment")]
    pub environment:              f64,
    #[serde(rename = "Resources")]
    pub resources:                f64,
    pub resource_cost_multiplier: f64,
}

impl TimeSeriesRecord {
    /// Values in `COLUMNS` order.
    pub fn values(&self) -> [f64; 12] {
        [
            self.time,
            self.k_ai,
            self.labor_u,
            self.unemployment_rate,
            self.labor_force,
            self.stability,
            self.public_pool,
            self.tax_rate,
            self.output,
            self.environment,
            self.resources,
            self.resource_cost_multiplier,
        ]
    }
}

/// Ordered, append-only sequence of records from one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { records: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, record: TimeSeriesRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&TimeSeriesRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&TimeSeriesRecord> {
        self.records.last()
    }

    /// Smallest value of a field, or `None` when empty.
    pub fn min_of(&self, field: impl Fn(&TimeSeriesRecord) -> f64) -> Option<f64> {
        self.records.iter().map(field).reduce(f64::min)
    }

    /// Largest value of a field, or `None` when empty.
    pub fn max_of(&self, field: impl Fn(&TimeSeriesRecord) -> f64) -> Option<f64> {
        self.records.iter().map(field).reduce(f64::max)
    }

    /// Time of the first record satisfying `pred`.
    pub fn first_time_where(&self, pred: impl Fn(&TimeSeriesRecord) -> bool) -> Option<Years> {
        self.records.iter().find(|r| pred(r)).map(|r| r.time)
    }
}

impl From<Vec<TimeSeriesRecord>> for TimeSeries {
    fn from(records: Vec<TimeSeriesRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a TimeSeriesRecord;
    type IntoIter = std::slice::Iter<'a, TimeSeriesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
