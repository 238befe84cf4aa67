//! Whole-series summaries for the stats and health surfaces
//!
//! Both are computed in one pass over any [`SeriesRow`] iterator.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    aggregate::round_to,
    time::{format_canonical, AbsoluteTime},
    traits::SeriesRow,
};

/// Min, max and mean of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSummary {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl Running {
    fn new(value: f64) -> Self {
        Self { min: value, max: value, sum: value, count: 1 }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn summary(&self, decimals: u32) -> SensorSummary {
        SensorSummary {
            min: round_to(self.min, decimals),
            max: round_to(self.max, decimals),
            mean: round_to(self.sum / self.count as f64, decimals),
        }
    }
}

/// Dataset statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Rows in the series
    pub total_records: usize,
    /// Rows per class code
    pub classes: BTreeMap<i64, usize>,
    /// Per-sensor summaries
    pub sensors: BTreeMap<String, SensorSummary>,
}

impl SeriesStats {
    /// Summarize rows, rounding to `decimals` places
    pub fn compute<'a, R, I>(rows: I, decimals: u32) -> Self
    where
        R: SeriesRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut total_records = 0;
        let mut classes = BTreeMap::new();
        let mut running: BTreeMap<String, Running> = BTreeMap::new();

        for row in rows {
            total_records += 1;
            if let Some(class) = row.class() {
                *classes.entry(class).or_insert(0) += 1;
            }
            row.visit_sensors(&mut |name, value| match running.get_mut(name) {
                Some(r) => r.push(value),
                None => {
                    running.insert(name.to_string(), Running::new(value));
                }
            });
        }

        Self {
            total_records,
            classes,
            sensors: running.into_iter().map(|(name, r)| (name, r.summary(decimals))).collect(),
        }
    }
}

/// Service health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Series loaded with rows
    Healthy,
    /// Series loaded but holds no rows
    Empty,
    /// Series could not be loaded
    Unavailable,
}

/// First and last timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeRange {
    /// Earliest timestamp
    pub start: Option<String>,
    /// Latest timestamp
    pub end: Option<String>,
}

/// Health report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    /// Overall status
    pub status: HealthStatus,
    /// Rows available
    pub records: usize,
    /// Covered time range
    pub time_range: TimeRange,
}

impl HealthSummary {
    /// Summarize a loaded series
    pub fn of<'a, R, I>(rows: I) -> Self
    where
        R: SeriesRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut records = 0;
        let mut bounds: Option<(AbsoluteTime, AbsoluteTime)> = None;
        for row in rows {
            records += 1;
            let at = row.timestamp();
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(at), hi.max(at)),
                None => (at, at),
            });
        }

        Self {
            status: if records > 0 { HealthStatus::Healthy } else { HealthStatus::Empty },
            records,
            time_range: TimeRange {
                start: bounds.map(|(lo, _)| format_canonical(&lo)),
                end: bounds.map(|(_, hi)| format_canonical(&hi)),
            },
        }
    }

    /// No series could be loaded
    pub fn unavailable() -> Self {
        Self { status: HealthStatus::Unavailable, records: 0, time_range: TimeRange::default() }
    }
}
