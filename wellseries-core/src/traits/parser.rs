//! Timestamp Parser Abstraction
//!
//! Raw exports mix several incompatible timestamp grammars, sometimes within
//! one file. Each grammar is a parser that first says whether it recognizes a
//! value and then tries to resolve it. The normalizer walks its parsers in a
//! fixed priority order and stops at the first success.
//!
//! Recognition and parsing are split so a value that *looks* like one grammar
//! but fails to parse can still fall through to the next one.

use crate::time::{AbsoluteTime, RolloverContext};

/// A raw timestamp value as seen by parsers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp<'a> {
    /// String value, untrimmed
    Text(&'a str),
    /// JSON number
    Numeric(f64),
}

impl<'a> RawTimestamp<'a> {
    /// Numeric view: JSON numbers and strings that are entirely a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawTimestamp::Numeric(n) => Some(*n),
            RawTimestamp::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Text view, trimmed
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            RawTimestamp::Text(s) => Some(s.trim()),
            RawTimestamp::Numeric(_) => None,
        }
    }
}

/// One timestamp grammar
///
/// ## Implementation Requirements
///
/// - `recognizes` must be cheap and side-effect free
/// - `parse` must not panic on any input; return `None` instead
/// - `parse` reads the rollover context but never mutates it; the caller
///   records the resolved time
pub trait TimestampParser {
    /// Short name used in reports and logs
    fn name(&self) -> &'static str;

    /// Whether the value is in this grammar
    fn recognizes(&self, raw: &RawTimestamp<'_>) -> bool;

    /// Resolve to an absolute time
    fn parse(&self, raw: &RawTimestamp<'_>, ctx: &RolloverContext) -> Option<AbsoluteTime>;
}
