//! Time handling for sensor exports
//!
//! Provides the absolute-time type of the canonical series and the context
//! that resolves relative timestamps:
//! - Base date (anchors `dayN` and first bare time-of-day values)
//! - Rollover tracking (bare time-of-day logs that wrap past midnight)
//! - Canonical formatting and parsing
//! - Bucket truncation helpers

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::constants::time::{
    BASE_DATE_YMD, CADENCE_SECONDS, CANONICAL_TIMESTAMP_FORMAT, ISO_DATETIME_FORMATS, DATE_FORMAT,
};

/// Absolute point in time, second precision, timezone-naive
pub type AbsoluteTime = NaiveDateTime;

/// Default base date (2024-01-01)
pub fn default_base_date() -> NaiveDate {
    let (y, m, d) = BASE_DATE_YMD;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// One step of the canonical grid
pub fn cadence() -> Duration {
    Duration::seconds(CADENCE_SECONDS)
}

/// Format as `YYYY-MM-DDTHH:MM:SS`
pub fn format_canonical(at: &AbsoluteTime) -> String {
    at.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
}

/// Parse a naive ISO-8601 date-time (`T` or space separated, optional
/// seconds and fraction). Offsets are not accepted here.
pub fn parse_naive_iso(value: &str) -> Option<AbsoluteTime> {
    let value = value.trim();
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parse a bare calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// True when the timestamp sits exactly on a minute boundary
pub fn is_minute_aligned(at: &AbsoluteTime) -> bool {
    at.second() == 0 && at.nanosecond() == 0
}

/// Truncate to the start of the hour
pub fn truncate_to_hour(at: &AbsoluteTime) -> AbsoluteTime {
    at.date().and_hms_opt(at.hour(), 0, 0).unwrap_or(*at)
}

/// Truncate to midnight
pub fn truncate_to_day(at: &AbsoluteTime) -> AbsoluteTime {
    at.date().and_time(NaiveTime::default())
}

/// Tracks the last resolved time so bare time-of-day values can be placed
/// on the right calendar day.
///
/// Sensor logs that record only `HH:MM:SS` wrap past midnight silently. A
/// value that does not move forward relative to the previous one means the
/// day rolled over.
#[derive(Debug, Clone)]
pub struct RolloverContext {
    base_date: NaiveDate,
    last_known: Option<AbsoluteTime>,
}

impl RolloverContext {
    /// Create a context anchored at `base_date`
    pub fn new(base_date: NaiveDate) -> Self {
        Self { base_date, last_known: None }
    }

    /// Anchor date for relative values
    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// Last resolved time, if any
    pub fn last_known(&self) -> Option<AbsoluteTime> {
        self.last_known
    }

    /// Record a resolved time
    pub fn observe(&mut self, at: AbsoluteTime) {
        self.last_known = Some(at);
    }

    /// Place a time-of-day after the last known time
    ///
    /// Returns `None` only if advancing the date overflows the calendar.
    pub fn resolve_time_of_day(&self, time: NaiveTime) -> Option<AbsoluteTime> {
        match self.last_known {
            None => Some(self.base_date.and_time(time)),
            Some(last) => {
                let candidate = last.date().and_time(time);
                if candidate > last {
                    Some(candidate)
                } else {
                    candidate.checked_add_signed(Duration::days(1))
                }
            }
        }
    }

    /// Forget the last known time
    pub fn reset(&mut self) {
        self.last_known = None;
    }
}

impl Default for RolloverContext {
    fn default() -> Self {
        Self::new(default_base_date())
    }
}

/// Serde adapter writing timestamps in the canonical format
pub mod canonical_format {
    use super::{format_canonical, parse_naive_iso, AbsoluteTime};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize as `YYYY-MM-DDTHH:MM:SS`
    pub fn serialize<S: Serializer>(at: &AbsoluteTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_canonical(at))
    }

    /// Deserialize any naive ISO-8601 date-time
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AbsoluteTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_naive_iso(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn first_time_of_day_lands_on_base_date() {
        let ctx = RolloverContext::default();
        let resolved = ctx.resolve_time_of_day(at(0, 2, 0)).unwrap();
        assert_eq!(resolved, default_base_date().and_time(at(0, 2, 0)));
    }

    #[test]
    fn backwards_time_rolls_to_next_day() {
        let mut ctx = RolloverContext::default();
        ctx.observe(default_base_date().and_time(at(23, 59, 0)));

        let resolved = ctx.resolve_time_of_day(at(0, 0, 0)).unwrap();
        assert_eq!(resolved.date(), default_base_date().succ_opt().unwrap());

        // Equal time is not strictly after, so it rolls too
        ctx.observe(default_base_date().and_time(at(10, 0, 0)));
        let same = ctx.resolve_time_of_day(at(10, 0, 0)).unwrap();
        assert_eq!(same.date(), default_base_date().succ_opt().unwrap());
    }

    #[test]
    fn truncation() {
        let ts = parse_naive_iso("2024-03-05T17:42:00").unwrap();
        assert_eq!(format_canonical(&truncate_to_hour(&ts)), "2024-03-05T17:00:00");
        assert_eq!(format_canonical(&truncate_to_day(&ts)), "2024-03-05T00:00:00");
    }

    #[test]
    fn parses_space_and_t_separators() {
        assert_eq!(parse_naive_iso("2024-01-01 00:01:00"), parse_naive_iso("2024-01-01T00:01:00"));
        assert!(parse_naive_iso("2024-01-01T00:01").is_some());
        assert!(parse_naive_iso("2024-01-01T00:01:00.500").is_some());
        assert!(parse_naive_iso("yesterday").is_none());
    }

    #[test]
    fn minute_alignment() {
        assert!(is_minute_aligned(&parse_naive_iso("2024-01-01T00:01:00").unwrap()));
        assert!(!is_minute_aligned(&parse_naive_iso("2024-01-01T00:01:30").unwrap()));
        assert!(!is_minute_aligned(&parse_naive_iso("2024-01-01T00:01:00.250").unwrap()));
    }
}
