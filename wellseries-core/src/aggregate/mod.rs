//! Query-time Aggregation
//!
//! ## Overview
//!
//! Filters a series by well, time range and class, groups the surviving rows
//! into minute, hour or day buckets, and reports per-field means with the
//! number of contributing rows. Nothing is precomputed; every query is one
//! linear scan.
//!
//! ```text
//! rows ──► filter(well, start..=end, class) ──► bucket key ──► sums/counts
//!                                                                  │
//!                      points (ascending, limited) ◄── round(mean) ┘
//! ```
//!
//! ## Bucket Keys
//!
//! | Granularity | Key                    |
//! |-------------|------------------------|
//! | `minute`    | `YYYY-MM-DDTHH:MM:SS`  |
//! | `hour`      | `YYYY-MM-DD HH:00:00`  |
//! | `day`       | `YYYY-MM-DD 00:00:00`  |
//!
//! ## Range Bounds
//!
//! A bound given as a bare date compares on calendar date, so an `end` of
//! `2024-01-02` admits every row on that day. A bound with a time compares on
//! the exact instant.
//!
//! ## Usage Example
//!
//! ```rust
//! use wellseries_core::aggregate::{AggregationEngine, Granularity, TimeseriesQuery};
//! use wellseries_core::{CanonicalRecord, QueryConfig};
//! use wellseries_core::time::parse_naive_iso;
//!
//! let rows = vec![
//!     CanonicalRecord::new(parse_naive_iso("2024-01-01T00:01:00").unwrap(), 1, 0).with_sensor("p_pdg", 1.0),
//!     CanonicalRecord::new(parse_naive_iso("2024-01-01T23:59:00").unwrap(), 1, 0).with_sensor("p_pdg", 2.0),
//! ];
//!
//! let engine = AggregationEngine::new(QueryConfig::default());
//! let response = engine.query(&rows, &TimeseriesQuery::new(1, Granularity::Day));
//!
//! assert_eq!(response.count, 1);
//! assert_eq!(response.points[0].name, "2024-01-01 00:00:00");
//! assert_eq!(response.points[0].value["p_pdg"], 1.5);
//! assert_eq!(response.points[0].sample_count, 2);
//! ```

pub mod bucket;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::QueryConfig,
    errors::{QueryError, QueryResult},
    time::{format_canonical, parse_date, parse_naive_iso, truncate_to_day, truncate_to_hour, AbsoluteTime},
    traits::SeriesRow,
};

pub use bucket::{round_to, BucketAccumulator};

// =============================================================================
// Query Parameters
// =============================================================================

/// Bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per row timestamp
    Minute,
    /// Calendar hour
    Hour,
    /// Calendar day
    Day,
}

impl Granularity {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        }
    }

    /// Start of the bucket containing `at`
    pub fn bucket_start(&self, at: &AbsoluteTime) -> AbsoluteTime {
        match self {
            Granularity::Minute => *at,
            Granularity::Hour => truncate_to_hour(at),
            Granularity::Day => truncate_to_day(at),
        }
    }

    /// Display key of a bucket start
    pub fn label(&self, start: &AbsoluteTime) -> String {
        match self {
            Granularity::Minute => format_canonical(start),
            Granularity::Hour | Granularity::Day => start.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            _ => Err(QueryError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Which buckets survive a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    /// Oldest buckets
    Earliest,
    /// Most recent buckets
    #[default]
    Latest,
}

impl FromStr for LimitPolicy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" => Ok(LimitPolicy::Earliest),
            "latest" => Ok(LimitPolicy::Latest),
            _ => Err(QueryError::InvalidLimitPolicy(s.to_string())),
        }
    }
}

/// Inclusive range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// Whole calendar day
    Date(NaiveDate),
    /// Exact instant
    DateTime(AbsoluteTime),
}

impl RangeBound {
    /// Parse a `start`/`end` parameter
    pub fn parse(bound: &'static str, value: &str) -> QueryResult<Self> {
        if let Some(at) = parse_naive_iso(value) {
            return Ok(RangeBound::DateTime(at));
        }
        parse_date(value)
            .map(RangeBound::Date)
            .ok_or_else(|| QueryError::InvalidBound { bound, value: value.to_string() })
    }

    /// True when `at` is not before this bound
    pub fn admits_from(&self, at: &AbsoluteTime) -> bool {
        match self {
            RangeBound::Date(date) => at.date() >= *date,
            RangeBound::DateTime(start) => at >= start,
        }
    }

    /// True when `at` is not after this bound
    pub fn admits_until(&self, at: &AbsoluteTime) -> bool {
        match self {
            RangeBound::Date(date) => at.date() <= *date,
            RangeBound::DateTime(end) => at <= end,
        }
    }
}

/// A validated timeseries query
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesQuery {
    /// Well to select
    pub well_id: i64,
    /// Inclusive lower bound
    pub start: Option<RangeBound>,
    /// Inclusive upper bound
    pub end: Option<RangeBound>,
    /// Class to select
    pub class_id: Option<i64>,
    /// Bucket width
    pub granularity: Granularity,
    /// Maximum number of buckets, unlimited when `None`
    pub limit: Option<usize>,
}

impl TimeseriesQuery {
    /// Query one well with no other filters
    pub fn new(well_id: i64, granularity: Granularity) -> Self {
        Self { well_id, start: None, end: None, class_id: None, granularity, limit: None }
    }

    /// Set the lower bound
    pub fn with_start(mut self, start: RangeBound) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the upper bound
    pub fn with_end(mut self, end: RangeBound) -> Self {
        self.end = Some(end);
        self
    }

    /// Select one class
    pub fn with_class(mut self, class_id: i64) -> Self {
        self.class_id = Some(class_id);
        self
    }

    /// Cap the number of buckets
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the row passes every filter
    ///
    /// Rows without a well id count as `default_well_id`, the well the
    /// regularizer would file them under.
    pub fn matches<R: SeriesRow + ?Sized>(&self, row: &R, default_well_id: i64) -> bool {
        if row.well_id().unwrap_or(default_well_id) != self.well_id {
            return false;
        }
        let at = row.timestamp();
        if self.start.as_ref().is_some_and(|b| !b.admits_from(&at)) {
            return false;
        }
        if self.end.as_ref().is_some_and(|b| !b.admits_until(&at)) {
            return false;
        }
        match self.class_id {
            Some(class_id) => row.class() == Some(class_id),
            None => true,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// One bucket of the response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Bucket key
    pub name: String,
    /// Rounded mean per field
    pub value: BTreeMap<String, f64>,
    /// Rows in the bucket
    pub sample_count: usize,
}

/// Timeseries query response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesResponse {
    /// Queried well
    pub well_id: i64,
    /// Bucket width
    pub granularity: Granularity,
    /// Number of points
    pub count: usize,
    /// Buckets in ascending order
    pub points: Vec<Point>,
}

impl TimeseriesResponse {
    /// Response with no points
    pub fn empty(query: &TimeseriesQuery) -> Self {
        Self { well_id: query.well_id, granularity: query.granularity, count: 0, points: Vec::new() }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Single-pass bucket aggregation
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    config: QueryConfig,
}

impl AggregationEngine {
    /// Create an engine
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Run a query over any rows
    pub fn query<'a, R, I>(&self, rows: I, query: &TimeseriesQuery) -> TimeseriesResponse
    where
        R: SeriesRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut buckets: BTreeMap<AbsoluteTime, BucketAccumulator> = BTreeMap::new();
        let mut scanned = 0usize;

        for row in rows {
            scanned += 1;
            if !query.matches(row, self.config.default_well_id) {
                continue;
            }
            let acc = buckets.entry(query.granularity.bucket_start(&row.timestamp())).or_default();
            acc.add_sample();
            row.visit_sensors(&mut |name, value| acc.add(name, value));
        }

        let total = buckets.len();
        let keep = query.limit.unwrap_or(total).min(total);
        let skip = match self.config.limit_policy {
            LimitPolicy::Earliest => 0,
            LimitPolicy::Latest => total - keep,
        };

        let points: Vec<Point> = buckets
            .iter()
            .skip(skip)
            .take(keep)
            .map(|(start, acc)| Point {
                name: query.granularity.label(start),
                value: acc.means(self.config.round_decimals),
                sample_count: acc.samples(),
            })
            .collect();

        debug!(
            "well {} {}: scanned {scanned} rows into {total} buckets, returning {}",
            query.well_id,
            query.granularity,
            points.len()
        );

        TimeseriesResponse {
            well_id: query.well_id,
            granularity: query.granularity,
            count: points.len(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CanonicalRecord;

    fn row(ts: &str, well: i64, class: i64, p: f64) -> CanonicalRecord {
        CanonicalRecord::new(parse_naive_iso(ts).unwrap(), well, class).with_sensor("p_pdg", p)
    }

    #[test]
    fn granularity_parsing() {
        assert_eq!("Hour".parse::<Granularity>(), Ok(Granularity::Hour));
        assert_eq!(" day ".parse::<Granularity>(), Ok(Granularity::Day));
        assert_eq!(
            "week".parse::<Granularity>(),
            Err(QueryError::InvalidGranularity("week".to_string()))
        );
    }

    #[test]
    fn bucket_labels() {
        let at = parse_naive_iso("2024-03-05T07:42:00").unwrap();
        assert_eq!(Granularity::Minute.label(&Granularity::Minute.bucket_start(&at)), "2024-03-05T07:42:00");
        assert_eq!(Granularity::Hour.label(&Granularity::Hour.bucket_start(&at)), "2024-03-05 07:00:00");
        assert_eq!(Granularity::Day.label(&Granularity::Day.bucket_start(&at)), "2024-03-05 00:00:00");
    }

    #[test]
    fn date_bounds_cover_whole_days() {
        let end = RangeBound::parse("end", "2024-01-02").unwrap();
        assert!(end.admits_until(&parse_naive_iso("2024-01-02T23:59:00").unwrap()));
        assert!(!end.admits_until(&parse_naive_iso("2024-01-03T00:00:00").unwrap()));

        let end = RangeBound::parse("end", "2024-01-02T12:00").unwrap();
        assert!(end.admits_until(&parse_naive_iso("2024-01-02T12:00:00").unwrap()));
        assert!(!end.admits_until(&parse_naive_iso("2024-01-02T12:01:00").unwrap()));

        assert!(matches!(
            RangeBound::parse("start", "01/02/2024"),
            Err(QueryError::InvalidBound { bound: "start", .. })
        ));
    }

    #[test]
    fn hour_buckets_and_class_filter() {
        let rows = vec![
            row("2024-01-01T10:00:00", 1, 0, 1.0),
            row("2024-01-01T10:30:00", 1, 3, 100.0),
            row("2024-01-01T10:59:00", 1, 0, 2.0),
            row("2024-01-01T11:00:00", 1, 0, 4.0),
            row("2024-01-01T11:00:00", 2, 0, 9.0),
        ];
        let engine = AggregationEngine::default();

        let response = engine.query(&rows, &TimeseriesQuery::new(1, Granularity::Hour).with_class(0));
        assert_eq!(response.count, 2);
        assert_eq!(response.points[0].name, "2024-01-01 10:00:00");
        assert_eq!(response.points[0].value["p_pdg"], 1.5);
        assert_eq!(response.points[0].sample_count, 2);
        assert_eq!(response.points[1].value["p_pdg"], 4.0);
    }

    #[test]
    fn limit_policies() {
        let rows: Vec<_> = (0..5)
            .map(|m| row(&format!("2024-01-01T00:0{m}:00"), 1, 0, m as f64))
            .collect();
        let query = TimeseriesQuery::new(1, Granularity::Minute).with_limit(2);

        let latest = AggregationEngine::default().query(&rows, &query);
        assert_eq!(latest.points[0].name, "2024-01-01T00:03:00");
        assert_eq!(latest.count, 2);

        let earliest = AggregationEngine::new(QueryConfig::default().with_limit_policy(LimitPolicy::Earliest))
            .query(&rows, &query);
        assert_eq!(earliest.points[0].name, "2024-01-01T00:00:00");
        assert_eq!(earliest.points[1].name, "2024-01-01T00:01:00");
    }

    #[test]
    fn response_serializes_lowercase_granularity() {
        let response = TimeseriesResponse::empty(&TimeseriesQuery::new(4, Granularity::Day));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["granularity"], "day");
        assert_eq!(json["count"], 0);
        assert_eq!(json["points"], serde_json::json!([]));
    }
}
