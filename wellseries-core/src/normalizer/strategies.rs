//! Built-in timestamp grammars
//!
//! ```text
//! Iso8601    2024-01-01T00:01:00, 2024-01-01 00:01, 2024-01-01T00:01:00Z
//! DayOffset  day1 12:01:00 AM, DAY-3 00:10:00, day_12
//! TimeOfDay  00:02:00, 7:05 PM, 23:59
//! Epoch      1704067260, 1704067260000, "1704067260"
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    constants::time::{MS_PER_SECOND, TIME_OF_DAY_FORMATS},
    time::{parse_date, parse_naive_iso, AbsoluteTime, RolloverContext},
    traits::{RawTimestamp, TimestampParser},
};

/// Largest day number accepted in a `dayN` value (about 270,000 years)
const MAX_DAY_OFFSET: i64 = 100_000_000;

lazy_static! {
    static ref ISO_PATTERN: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?(?:Z|[+-]\d{2}:?\d{2})?$"
    ).expect("valid ISO pattern");

    static ref DAY_OFFSET_PATTERN: Regex =
        Regex::new(r"(?i)^day\s*[-_]?\s*(\d+)(.*)$").expect("valid day-offset pattern");

    static ref TIME_OF_DAY_PATTERN: Regex =
        Regex::new(r"(?i)^\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]m)?$").expect("valid time-of-day pattern");
}

/// Parse `HH:MM[:SS]` with optional AM/PM against the fallback format list
///
/// `"12:01:00am"` and `"12:01:00 AM"` are equivalent.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let mut text = value.trim().to_uppercase();
    if text.is_empty() {
        return None;
    }
    if (text.ends_with("AM") || text.ends_with("PM")) && !text[..text.len() - 2].ends_with(' ') {
        text.insert(text.len() - 2, ' ');
    }

    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&text, fmt).ok())
}

/// Decode an epoch in seconds or milliseconds
///
/// Magnitudes above `ms_threshold` are milliseconds. Decoded years before
/// `min_year` are remapped onto `base_date` by day of month.
pub fn decode_epoch(
    value: f64,
    ms_threshold: f64,
    min_year: i32,
    base_date: NaiveDate,
) -> Option<AbsoluteTime> {
    if !value.is_finite() {
        return None;
    }
    let seconds = if value.abs() > ms_threshold { value / MS_PER_SECOND } else { value };
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    let decoded = DateTime::from_timestamp(whole as i64, nanos)?.naive_utc();

    if decoded.year() < min_year {
        let offset = Duration::days(i64::from(decoded.day()) - 1);
        return base_date.checked_add_signed(offset).map(|date| date.and_time(decoded.time()));
    }
    Some(decoded)
}

/// Settings the strategies read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategySettings {
    /// Epoch magnitude above which values are milliseconds
    pub epoch_ms_threshold: f64,
    /// Epoch years before this are remapped onto the base date
    pub min_plausible_year: i32,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            epoch_ms_threshold: crate::constants::EPOCH_MS_THRESHOLD,
            min_plausible_year: crate::constants::MIN_PLAUSIBLE_YEAR,
        }
    }
}

/// The timestamp grammars, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimestampStrategy {
    /// ISO-8601 date or date-time
    Iso8601,
    /// `dayN <time>` relative to the base date
    DayOffset,
    /// Bare time of day with rollover inference
    TimeOfDay,
    /// Unix epoch seconds or milliseconds
    Epoch,
}

impl TimestampStrategy {
    /// Fixed dispatch order, first success wins
    pub const ORDER: [TimestampStrategy; 4] = [
        TimestampStrategy::Iso8601,
        TimestampStrategy::DayOffset,
        TimestampStrategy::TimeOfDay,
        TimestampStrategy::Epoch,
    ];

    /// Resolve with explicit epoch settings
    pub fn parse_with(
        &self,
        raw: &RawTimestamp<'_>,
        ctx: &RolloverContext,
        settings: &StrategySettings,
    ) -> Option<AbsoluteTime> {
        match self {
            TimestampStrategy::Iso8601 => parse_iso(raw.as_text()?),
            TimestampStrategy::DayOffset => parse_day_offset(raw.as_text()?, ctx.base_date()),
            TimestampStrategy::TimeOfDay => {
                ctx.resolve_time_of_day(parse_time_of_day(raw.as_text()?)?)
            }
            TimestampStrategy::Epoch => decode_epoch(
                raw.as_number()?,
                settings.epoch_ms_threshold,
                settings.min_plausible_year,
                ctx.base_date(),
            ),
        }
    }
}

impl TimestampParser for TimestampStrategy {
    fn name(&self) -> &'static str {
        match self {
            TimestampStrategy::Iso8601 => "iso8601",
            TimestampStrategy::DayOffset => "day_offset",
            TimestampStrategy::TimeOfDay => "time_of_day",
            TimestampStrategy::Epoch => "epoch",
        }
    }

    fn recognizes(&self, raw: &RawTimestamp<'_>) -> bool {
        match (self, raw) {
            (TimestampStrategy::Iso8601, RawTimestamp::Text(s)) => ISO_PATTERN.is_match(s.trim()),
            (TimestampStrategy::DayOffset, RawTimestamp::Text(s)) => DAY_OFFSET_PATTERN.is_match(s.trim()),
            (TimestampStrategy::TimeOfDay, RawTimestamp::Text(s)) => TIME_OF_DAY_PATTERN.is_match(s.trim()),
            (TimestampStrategy::Epoch, raw) => raw.as_number().is_some(),
            _ => false,
        }
    }

    fn parse(&self, raw: &RawTimestamp<'_>, ctx: &RolloverContext) -> Option<AbsoluteTime> {
        self.parse_with(raw, ctx, &StrategySettings::default())
    }
}

fn parse_iso(text: &str) -> Option<AbsoluteTime> {
    if let Some(at) = parse_naive_iso(text) {
        return Some(at);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(at) = DateTime::parse_from_str(text, fmt) {
            return Some(at.naive_local());
        }
    }
    if let Some(stripped) = text.strip_suffix('Z') {
        return parse_naive_iso(stripped);
    }
    parse_date(text).map(|date| date.and_time(NaiveTime::default()))
}

fn parse_day_offset(text: &str, base_date: NaiveDate) -> Option<AbsoluteTime> {
    let captures = DAY_OFFSET_PATTERN.captures(text)?;
    let day: i64 = captures.get(1)?.as_str().parse().ok()?;
    if day > MAX_DAY_OFFSET {
        return None;
    }
    let date = base_date.checked_add_signed(Duration::days(day - 1))?;

    // An unreadable time suffix still yields the day at midnight
    let time = captures
        .get(2)
        .and_then(|rest| parse_time_of_day(rest.as_str()))
        .unwrap_or_default();

    Some(date.and_time(time))
}
