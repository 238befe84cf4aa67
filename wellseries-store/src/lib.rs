//! Persistence and query service for Wellseries
//!
//! Glue around `wellseries-core`:
//! - JSON loaders for raw exports and the canonical series, and the canonical writer
//! - [`SnapshotStore`]: the canonical series loaded once and shared as an `Arc`
//! - [`QueryService`]: validated `timeseries`, `stats` and `health` operations
//!
//! ```no_run
//! use wellseries_core::{Normalizer, Regularizer};
//! use wellseries_store::{load_raw, write_canonical};
//!
//! let raw = load_raw("data/raw.json")?;
//! let batch = Normalizer::default().normalize_batch(raw.rows);
//! let series = Regularizer::default().regularize_wells(&batch.records);
//! write_canonical("data/processed.json", &series.records)?;
//! # Ok::<(), wellseries_store::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod json;
pub mod service;
pub mod snapshot;

// Public API
pub use errors::{ServiceError, StoreError, StoreResult};
pub use json::{load_canonical, load_raw, write_canonical, Loaded};
pub use service::{QueryService, TimeseriesParams};
pub use snapshot::{SeriesSnapshot, SnapshotStore};
