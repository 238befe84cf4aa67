//! Read-side query surface
//!
//! ## Overview
//!
//! [`QueryService`] answers the three read operations over the cached
//! canonical series:
//!
//! | Operation    | Result                                               |
//! |--------------|------------------------------------------------------|
//! | `timeseries` | bucketed means for one well, filtered and limited    |
//! | `stats`      | total rows, rows per class, min/max/mean per sensor  |
//! | `health`     | status, row count and covered time range             |
//!
//! Parameters arrive as strings, the way a query string or CLI flag carries
//! them, and are validated before any data is touched. A bad parameter is a
//! [`QueryError`]; an unloadable series is a [`StoreError`]. `health` never
//! fails and reports `unavailable` instead.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use wellseries_store::{QueryService, SnapshotStore, TimeseriesParams};
//! use wellseries_core::QueryConfig;
//!
//! let service = QueryService::new(SnapshotStore::new("data/processed.json"), QueryConfig::default());
//! let params = TimeseriesParams::default().with_well_id("1").with_granularity("hour").with_limit("24");
//! let response = service.timeseries(&params)?;
//! println!("{} hourly points", response.count);
//! # Ok::<(), wellseries_store::ServiceError>(())
//! ```

use std::sync::Arc;

use log::warn;
use serde::Deserialize;

use wellseries_core::{
    constants::DEFAULT_WELL_ID, AggregationEngine, Granularity, HealthSummary, QueryConfig, QueryError,
    QueryResult, RangeBound, SeriesStats, TimeseriesQuery, TimeseriesResponse,
};

use crate::{
    errors::{ServiceError, StoreError},
    snapshot::{SeriesSnapshot, SnapshotStore},
};

/// Unvalidated timeseries parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeseriesParams {
    /// Well to select, defaults to well 1
    pub well_id: Option<String>,
    /// Inclusive lower bound, date or date-time
    #[serde(alias = "start_time")]
    pub start: Option<String>,
    /// Inclusive upper bound, date or date-time
    #[serde(alias = "end_time")]
    pub end: Option<String>,
    /// Class to select
    pub class_id: Option<String>,
    /// `minute`, `hour` or `day`, defaults to `minute`
    #[serde(alias = "aggregation")]
    pub granularity: Option<String>,
    /// Maximum number of buckets
    pub limit: Option<String>,
}

impl TimeseriesParams {
    /// Set `well_id`
    pub fn with_well_id(mut self, value: &str) -> Self {
        self.well_id = Some(value.to_string());
        self
    }

    /// Set `start`
    pub fn with_start(mut self, value: &str) -> Self {
        self.start = Some(value.to_string());
        self
    }

    /// Set `end`
    pub fn with_end(mut self, value: &str) -> Self {
        self.end = Some(value.to_string());
        self
    }

    /// Set `class_id`
    pub fn with_class_id(mut self, value: &str) -> Self {
        self.class_id = Some(value.to_string());
        self
    }

    /// Set `granularity`
    pub fn with_granularity(mut self, value: &str) -> Self {
        self.granularity = Some(value.to_string());
        self
    }

    /// Set `limit`
    pub fn with_limit(mut self, value: &str) -> Self {
        self.limit = Some(value.to_string());
        self
    }

    /// Check every parameter and build the query
    pub fn validate(&self, config: &QueryConfig) -> QueryResult<TimeseriesQuery> {
        let well_id = match present(&self.well_id) {
            Some(value) => parse_id("well_id", value)?,
            None => DEFAULT_WELL_ID,
        };
        let granularity = match present(&self.granularity) {
            Some(value) => value.parse()?,
            None => Granularity::Minute,
        };

        let mut query = TimeseriesQuery::new(well_id, granularity);
        if let Some(value) = present(&self.start) {
            query = query.with_start(RangeBound::parse("start", value)?);
        }
        if let Some(value) = present(&self.end) {
            query = query.with_end(RangeBound::parse("end", value)?);
        }
        if let Some(value) = present(&self.class_id) {
            query = query.with_class(parse_id("class_id", value)?);
        }
        if let Some(value) = present(&self.limit) {
            query = query.with_limit(parse_limit(value, config.max_limit)?);
        }
        Ok(query)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(field: &'static str, value: &str) -> QueryResult<i64> {
    value.parse().map_err(|_| QueryError::InvalidId { field, value: value.to_string() })
}

fn parse_limit(value: &str, max: usize) -> QueryResult<usize> {
    match value.parse::<usize>() {
        Ok(limit) if (1..=max).contains(&limit) => Ok(limit),
        _ => Err(QueryError::InvalidLimit { value: value.to_string(), max }),
    }
}

/// Timeseries, stats and health over a snapshot store
#[derive(Debug)]
pub struct QueryService {
    store: SnapshotStore,
    engine: AggregationEngine,
}

impl QueryService {
    /// Create a service; the series is loaded on the first request
    pub fn new(store: SnapshotStore, config: QueryConfig) -> Self {
        Self { store, engine: AggregationEngine::new(config) }
    }

    /// Underlying store
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Bucketed means for one well
    pub fn timeseries(&self, params: &TimeseriesParams) -> Result<TimeseriesResponse, ServiceError> {
        let query = params.validate(self.engine.config())?;
        let snapshot = self.store.snapshot()?;
        Ok(self.engine.query(snapshot.records(), &query))
    }

    /// Whole-series statistics
    pub fn stats(&self) -> Result<SeriesStats, ServiceError> {
        let snapshot = self.store.snapshot()?;
        Ok(SeriesStats::compute(snapshot.records(), self.engine.config().round_decimals))
    }

    /// Service health; load failures degrade to `unavailable`
    pub fn health(&self) -> HealthSummary {
        match self.store.snapshot() {
            Ok(snapshot) => HealthSummary::of(snapshot.records()),
            Err(e) => {
                warn!("health check: {e}");
                HealthSummary::unavailable()
            }
        }
    }

    /// Re-read the series file
    pub fn reload(&self) -> Result<Arc<SeriesSnapshot>, StoreError> {
        self.store.reload()
    }
}
