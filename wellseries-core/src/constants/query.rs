//! Query Defaults

/// Decimal places kept in aggregated means and summaries.
pub const ROUND_DECIMALS: u32 = 2;

/// Largest limit a caller may request.
pub const MAX_LIMIT: usize = 1000;
