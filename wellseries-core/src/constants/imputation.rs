//! Imputation Thresholds
//!
//! The fraction of nulls in a sensor column decides how it is filled. Sparse
//! gaps are interpolated; moderate gaps are carried forward; columns that are
//! mostly holes fall back to class means, because interpolating across long
//! runs of nulls invents trends that never existed.
//!
//! ```text
//! p == 0            untouched
//! 0    < p < 0.05   linear interpolation (both directions)
//! 0.05 <= p < 0.20  forward fill, then backward fill
//! 0.20 <= p         class-conditional mean, then global mean
//! ```

/// Upper bound (exclusive) of the interpolation band.
pub const INTERPOLATION_MAX_NULL_FRACTION: f64 = 0.05;

/// Upper bound (exclusive) of the forward/backward fill band.
pub const FILL_MAX_NULL_FRACTION: f64 = 0.20;
