//! Time-Related Constants
//!
//! Cadence of the canonical series, the base date that anchors relative
//! timestamps, and the magnitudes used to tell epoch units apart.

// ===== TIME UNIT CONVERSIONS =====

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Milliseconds per second.
pub const MS_PER_SECOND: f64 = 1000.0;

// ===== CADENCE =====

/// Spacing of the regularized series in seconds.
///
/// Source exports log one row per minute; anything finer is jitter.
pub const CADENCE_SECONDS: i64 = SECONDS_PER_MINUTE;

/// Widest span, in minutes, one well's series may cover after regularization.
///
/// Every minute in the span becomes a row, so a single far-off timestamp
/// (an epoch in the year 2603 is still a valid epoch) would otherwise expand
/// into hundreds of millions of rows. Rows outside the densest window of this
/// width are dropped and counted.
pub const MAX_SPAN_MINUTES: i64 = 366 * 24 * 60;

// ===== RELATIVE TIMESTAMPS =====

/// Year, month and day of the base date.
///
/// `day1` and bare time-of-day values resolve relative to this date. It has no
/// physical meaning; it only has to be stable across runs so the canonical file
/// does not shift.
pub const BASE_DATE_YMD: (i32, u32, u32) = (2024, 1, 1);

// ===== EPOCH DISAMBIGUATION =====

/// Epoch magnitudes above this are milliseconds, below are seconds.
///
/// 2×10^10 seconds is the year 2603, while 2×10^10 milliseconds is August 1970,
/// so the two ranges never overlap for plausible telemetry.
pub const EPOCH_MS_THRESHOLD: f64 = 2e10;

/// Decoded epochs before this year are treated as spreadsheet serial dates.
///
/// A day count such as `45292` read as seconds lands on 1 January 1970; only its
/// day-of-month survives and is remapped onto the base date.
pub const MIN_PLAUSIBLE_YEAR: i32 = 2000;

// ===== FORMATS =====

/// Canonical timestamp format: ISO-8601, second precision, no offset.
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Time-of-day formats tried in order for day-offset and bare-time values.
///
/// Inputs are upper-cased and have a space inserted before `AM`/`PM` before
/// these are tried.
pub const TIME_OF_DAY_FORMATS: [&str; 4] = ["%I:%M:%S %p", "%H:%M:%S", "%H:%M", "%I:%M %p"];

/// Naive date-time formats accepted by the ISO-8601 strategy.
pub const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar date format used by date-only values and bucket labels.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
