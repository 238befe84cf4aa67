//! Constants for Wellseries Core
//!
//! Every threshold, default and field alias used by the pipeline lives here,
//! grouped by domain:
//! - **Time**: cadence, base date, epoch disambiguation
//! - **Imputation**: null-fraction bands that select a fill strategy
//! - **Fields**: column names and the aliases raw exports use for them
//! - **Query**: rounding and result-size limits
//!
//! Use these constants instead of magic numbers. New constants should say what
//! unit they carry in their name.

/// Time-related constants: cadence, base date, epoch magnitudes.
pub mod time;

/// Null-fraction bands for missing-value imputation.
pub mod imputation;

/// Canonical field names and raw-export aliases.
pub mod fields;

/// Aggregation query defaults and limits.
pub mod query;

pub use time::{
    BASE_DATE_YMD, CADENCE_SECONDS, MAX_SPAN_MINUTES, EPOCH_MS_THRESHOLD, MIN_PLAUSIBLE_YEAR,
    CANONICAL_TIMESTAMP_FORMAT,
};

pub use imputation::{INTERPOLATION_MAX_NULL_FRACTION, FILL_MAX_NULL_FRACTION};

pub use fields::{TIMESTAMP_FIELD, WELL_ID_FIELD, CLASS_FIELD, DEFAULT_WELL_ID, DEFAULT_CLASS};

pub use query::{ROUND_DECIMALS, MAX_LIMIT};
