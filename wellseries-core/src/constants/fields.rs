//! Field Names and Aliases
//!
//! Raw exports disagree on column names (`Timesteap` is a real header in the
//! field). Aliases are matched after name normalization, so `Well-ID`,
//! `well id` and `WELL_ID` all hit `well_id`.

/// Canonical timestamp column.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Canonical well identifier column.
pub const WELL_ID_FIELD: &str = "well_id";

/// Canonical class / event code column.
pub const CLASS_FIELD: &str = "class";

/// Normalized names that hold the raw timestamp.
pub const TIMESTAMP_ALIASES: [&str; 6] = ["timestamp", "timesteap", "time", "datetime", "date_time", "ts"];

/// Normalized names that hold the well identifier.
pub const WELL_ID_ALIASES: [&str; 3] = ["well_id", "well", "wellid"];

/// Normalized names that hold the class / event code.
pub const CLASS_ALIASES: [&str; 5] = ["class", "class_id", "event_id", "event", "label"];

/// Bookkeeping columns earlier cleaning runs leave behind. Never sensors.
pub const IGNORED_FIELDS: [&str; 2] = ["original_timestamp", "_old_timestamp"];

/// Well id assigned when the export carries none.
pub const DEFAULT_WELL_ID: i64 = 1;

/// Class assigned when the export carries none.
pub const DEFAULT_CLASS: i64 = 0;
