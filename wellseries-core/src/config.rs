//! Pipeline configuration
//!
//! Every section deserializes with defaults, so a config file only needs the
//! keys it changes:
//!
//! ```json
//! {
//!   "normalizer": { "base_date": "2023-06-01" },
//!   "regularizer": { "default_well_id": 7 },
//!   "query": { "limit_policy": "earliest" }
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::LimitPolicy,
    constants::{
        imputation::{FILL_MAX_NULL_FRACTION, INTERPOLATION_MAX_NULL_FRACTION},
        fields::{DEFAULT_CLASS, DEFAULT_WELL_ID},
        query::{MAX_LIMIT, ROUND_DECIMALS},
        time::{EPOCH_MS_THRESHOLD, MAX_SPAN_MINUTES, MIN_PLAUSIBLE_YEAR},
    },
    errors::ConfigError,
    time::default_base_date,
};

/// Timestamp normalizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Date that `day1` and the first bare time-of-day resolve to
    pub base_date: NaiveDate,
    /// Epoch magnitude above which values are milliseconds
    pub epoch_ms_threshold: f64,
    /// Decoded epoch years before this are remapped onto `base_date`
    pub min_plausible_year: i32,
}

impl NormalizerConfig {
    /// Override the base date
    pub fn with_base_date(mut self, base_date: NaiveDate) -> Self {
        self.base_date = base_date;
        self
    }

    /// Override the millisecond threshold
    pub fn with_epoch_ms_threshold(mut self, threshold: f64) -> Self {
        self.epoch_ms_threshold = threshold;
        self
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            base_date: default_base_date(),
            epoch_ms_threshold: EPOCH_MS_THRESHOLD,
            min_plausible_year: MIN_PLAUSIBLE_YEAR,
        }
    }
}

/// Series regularizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularizerConfig {
    /// Null fraction below which a column is interpolated
    pub interpolation_max_null_fraction: f64,
    /// Null fraction below which a column is forward/backward filled
    pub fill_max_null_fraction: f64,
    /// Well id for series whose export carries none
    pub default_well_id: i64,
    /// Class for series whose export carries none
    pub default_class: i64,
    /// Widest span one well's series may cover, in minutes
    pub max_span_minutes: i64,
}

impl RegularizerConfig {
    /// Override both imputation band bounds
    pub fn with_thresholds(mut self, interpolation: f64, fill: f64) -> Self {
        self.interpolation_max_null_fraction = interpolation;
        self.fill_max_null_fraction = fill;
        self
    }

    /// Override the default well id
    pub fn with_default_well_id(mut self, well_id: i64) -> Self {
        self.default_well_id = well_id;
        self
    }

    /// Override the maximum series span
    pub fn with_max_span_minutes(mut self, minutes: i64) -> Self {
        self.max_span_minutes = minutes;
        self
    }
}

impl Default for RegularizerConfig {
    fn default() -> Self {
        Self {
            interpolation_max_null_fraction: INTERPOLATION_MAX_NULL_FRACTION,
            fill_max_null_fraction: FILL_MAX_NULL_FRACTION,
            default_well_id: DEFAULT_WELL_ID,
            default_class: DEFAULT_CLASS,
            max_span_minutes: MAX_SPAN_MINUTES,
        }
    }
}

/// Aggregation query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Which buckets a limit keeps
    pub limit_policy: LimitPolicy,
    /// Largest limit accepted from callers
    pub max_limit: usize,
    /// Decimal places of aggregated values
    pub round_decimals: u32,
    /// Well that rows without a well id belong to
    pub default_well_id: i64,
}

impl QueryConfig {
    /// Override the limit policy
    pub fn with_limit_policy(mut self, policy: LimitPolicy) -> Self {
        self.limit_policy = policy;
        self
    }

    /// Override the well assumed for rows that carry none
    pub fn with_default_well_id(mut self, well_id: i64) -> Self {
        self.default_well_id = well_id;
        self
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            limit_policy: LimitPolicy::default(),
            max_limit: MAX_LIMIT,
            round_decimals: ROUND_DECIMALS,
            default_well_id: DEFAULT_WELL_ID,
        }
    }
}

/// All pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Timestamp normalization
    pub normalizer: NormalizerConfig,
    /// Regularization and imputation
    pub regularizer: RegularizerConfig,
    /// Query-time aggregation
    pub query: QueryConfig,
}

impl PipelineConfig {
    /// Parse from JSON and validate
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a well-defined pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interpolation = self.regularizer.interpolation_max_null_fraction;
        let fill = self.regularizer.fill_max_null_fraction;
        if !(0.0..=1.0).contains(&interpolation) || !(0.0..=1.0).contains(&fill) || interpolation > fill {
            return Err(ConfigError::InvalidThresholds { interpolation, fill });
        }

        let threshold = self.normalizer.epoch_ms_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidEpochThreshold(threshold));
        }

        if self.regularizer.max_span_minutes <= 0 {
            return Err(ConfigError::InvalidSpan(self.regularizer.max_span_minutes));
        }

        Ok(())
    }
}
