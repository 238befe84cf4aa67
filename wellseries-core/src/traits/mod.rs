//! Core Traits for Wellseries
//!
//! The two extension points of the pipeline:
//!
//! - [`parser`] - timestamp grammars the normalizer dispatches over
//! - [`row`] - rows the aggregation engine can scan
//!
//! ## Usage Example
//!
//! ```rust
//! use wellseries_core::traits::{TimestampParser, RawTimestamp};
//! use wellseries_core::normalizer::TimestampStrategy;
//! use wellseries_core::time::RolloverContext;
//!
//! let ctx = RolloverContext::default();
//! let raw = RawTimestamp::Text("day2 00:10:00");
//!
//! assert!(TimestampStrategy::DayOffset.recognizes(&raw));
//! let at = TimestampStrategy::DayOffset.parse(&raw, &ctx).unwrap();
//! assert_eq!(at.to_string(), "2024-01-02 00:10:00");
//! ```

pub mod parser;
pub mod row;

pub use parser::{TimestampParser, RawTimestamp};
pub use row::SeriesRow;
