//! Error Types for Normalization, Configuration and Queries
//!
//! ## Error Categories
//!
//! Failures fall into three groups that are handled very differently:
//!
//! ### Per-record rejections
//! - [`Rejection`]: a raw timestamp could not be resolved. The record is
//!   dropped and counted; the batch keeps going. These are values, not
//!   failures, and are returned inside [`Normalized`](crate::Normalized).
//!
//! ### Boundary validation
//! - [`QueryError`]: a query parameter is unusable (unknown granularity,
//!   non-numeric id, malformed date). Raised before any filtering happens so a
//!   caller never sees a partial result computed from a bad query.
//!
//! ### Grid construction
//! - [`SpanError`]: a series would resample onto more minutes than allowed.
//!   The regularizer trims outliers first, so it only surfaces from direct
//!   calls to [`resample`](crate::regularizer::resample::resample).
//!
//! ### Configuration
//! - [`ConfigError`]: thresholds or dates that would make the pipeline
//!   ill-defined.
//!
//! An empty filtered result is never an error.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use wellseries_core::{Granularity, QueryError};
//!
//! match "fortnight".parse::<Granularity>() {
//!     Ok(_) => unreachable!(),
//!     Err(QueryError::InvalidGranularity(value)) => {
//!         // Surface as a user-facing validation error
//!         assert_eq!(value, "fortnight");
//!     }
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```

use thiserror::Error;

/// Result type for query validation
pub type QueryResult<T> = Result<T, QueryError>;

/// Why a raw timestamp was rejected - kept `Copy` so reports can count them
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    /// No field under any timestamp alias
    #[error("record has no timestamp field")]
    MissingField,

    /// Field present but null or blank
    #[error("timestamp is empty")]
    Empty,

    /// No strategy recognized the value
    #[error("timestamp format not recognized")]
    Unrecognized,

    /// Recognized, but the date falls outside the representable calendar
    #[error("timestamp out of range")]
    OutOfRange,

    /// Numeric timestamp is NaN or infinite
    #[error("timestamp is not a finite number")]
    NonFinite,
}

/// Query parameter validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Granularity other than minute, hour or day
    #[error("invalid granularity '{0}': use minute, hour or day")]
    InvalidGranularity(String),

    /// Identifier that is not an integer
    #[error("invalid {field} '{value}': expected an integer")]
    InvalidId {
        /// Parameter name
        field: &'static str,
        /// Value as received
        value: String,
    },

    /// Range bound that is neither a date nor a date-time
    #[error("invalid {bound} bound '{value}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]")]
    InvalidBound {
        /// `start` or `end`
        bound: &'static str,
        /// Value as received
        value: String,
    },

    /// Limit outside `1..=max`
    #[error("invalid limit '{value}': expected an integer in 1..={max}")]
    InvalidLimit {
        /// Value as received
        value: String,
        /// Largest accepted limit
        max: usize,
    },

    /// Limit policy other than earliest or latest
    #[error("invalid limit policy '{0}': use earliest or latest")]
    InvalidLimitPolicy(String),
}

/// Series too wide to lay onto the one-minute grid
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("series spans {minutes} minutes, more than the {max} allowed")]
pub struct SpanError {
    /// Minutes between the first and last row
    pub minutes: i64,
    /// Largest span allowed
    pub max: i64,
}

/// Configuration that would make the pipeline ill-defined
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Imputation bands out of order or outside `[0, 1]`
    #[error("imputation thresholds must satisfy 0 <= {interpolation} <= {fill} <= 1")]
    InvalidThresholds {
        /// Upper bound of the interpolation band
        interpolation: f64,
        /// Upper bound of the fill band
        fill: f64,
    },

    /// Epoch threshold that is not a positive finite number
    #[error("epoch millisecond threshold must be positive and finite, got {0}")]
    InvalidEpochThreshold(f64),

    /// Maximum series span that is not positive
    #[error("max span must be a positive number of minutes, got {0}")]
    InvalidSpan(i64),

    /// Configuration file content could not be parsed
    #[error("config parse error: {0}")]
    Parse(String),
}
