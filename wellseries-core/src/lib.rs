//! Core pipeline for Wellseries
//!
//! Turns irregular oil-well sensor exports into a one-minute canonical series
//! and answers bucketed aggregation queries over it.
//!
//! Pipeline:
//! - Normalize: every raw timestamp grammar to an absolute time, or a counted rejection
//! - Regularize: dedup, impute, resample onto a one-minute grid
//! - Aggregate: filter and bucket by minute, hour or day at query time
//!
//! ```no_run
//! use wellseries_core::{Normalizer, PipelineConfig, RawRecord, Regularizer};
//! use wellseries_core::aggregate::{AggregationEngine, Granularity, TimeseriesQuery};
//!
//! let config = PipelineConfig::default();
//! let raw: Vec<RawRecord> = Vec::new(); // loaded from an export
//!
//! let batch = Normalizer::new(config.normalizer.clone()).normalize_batch(raw);
//! let series = Regularizer::new(config.regularizer.clone()).regularize_wells(&batch.records);
//!
//! let engine = AggregationEngine::new(config.query.clone());
//! let hourly = engine.query(&series.records, &TimeseriesQuery::new(1, Granularity::Hour));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod errors;
pub mod normalizer;
pub mod record;
pub mod regularizer;
pub mod stats;
pub mod time;
pub mod traits;

// Public API
pub use aggregate::{AggregationEngine, Granularity, LimitPolicy, Point, RangeBound, TimeseriesQuery, TimeseriesResponse};
pub use config::{NormalizerConfig, PipelineConfig, QueryConfig, RegularizerConfig};
pub use errors::{ConfigError, QueryError, QueryResult, Rejection, SpanError};
pub use normalizer::{NormalizeReport, Normalized, NormalizedBatch, NormalizedRecord, Normalizer};
pub use record::{CanonicalRecord, CanonicalRecordError, FieldValue, RawRecord};
pub use regularizer::{RegularizeReport, Regularized, Regularizer};
pub use stats::{HealthStatus, HealthSummary, SeriesStats};
pub use time::AbsoluteTime;
pub use traits::SeriesRow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
