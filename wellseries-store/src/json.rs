//! JSON series files
//!
//! Both raw exports and the canonical series are a single JSON array of flat
//! objects:
//!
//! ```json
//! [
//!   {"timestamp": "2024-01-01T00:01:00", "well_id": 1, "class": 0, "p_pdg": 100.0},
//!   {"timestamp": "2024-01-01T00:02:00", "well_id": 1, "class": 0, "p_pdg": 100.0}
//! ]
//! ```
//!
//! Rows that are not flat objects are skipped with a warning; the file as a
//! whole only fails when it cannot be read or parsed.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{info, warn};
use serde_json::Value;
use tempfile::NamedTempFile;

use wellseries_core::{CanonicalRecord, RawRecord};

use crate::errors::{StoreError, StoreResult};

/// Rows read from a file plus how many were skipped
#[derive(Debug, Clone, Default)]
pub struct Loaded<T> {
    /// Parsed rows in file order
    pub rows: Vec<T>,
    /// Rows that could not be read
    pub skipped: usize,
}

fn read_array(path: &Path) -> StoreResult<Vec<Value>> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(StoreError::NotAnArray(path.to_path_buf())),
    }
}

/// Load a raw export
pub fn load_raw(path: impl AsRef<Path>) -> StoreResult<Loaded<RawRecord>> {
    let path = path.as_ref();
    let mut loaded = Loaded::default();

    for (index, item) in read_array(path)?.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(item) {
            Ok(record) => loaded.rows.push(record),
            Err(e) => {
                warn!("{}: skipping row {index}: {e}", path.display());
                loaded.skipped += 1;
            }
        }
    }

    info!("loaded {} raw rows from {} ({} skipped)", loaded.rows.len(), path.display(), loaded.skipped);
    Ok(loaded)
}

/// Load a canonical series
pub fn load_canonical(path: impl AsRef<Path>) -> StoreResult<Loaded<CanonicalRecord>> {
    let path = path.as_ref();
    let raw = load_raw(path)?;
    let mut loaded = Loaded { rows: Vec::with_capacity(raw.rows.len()), skipped: raw.skipped };

    for (index, record) in raw.rows.iter().enumerate() {
        match CanonicalRecord::from_raw(record) {
            Ok(row) => loaded.rows.push(row),
            Err(e) => {
                warn!("{}: skipping canonical row {index}: {e}", path.display());
                loaded.skipped += 1;
            }
        }
    }

    Ok(loaded)
}

/// Replace a canonical series file
///
/// Writes a temp file in the target's directory and persists it over the
/// target, so readers see either the old series or the new one. A failed
/// write leaves no staging file behind.
pub fn write_canonical(path: impl AsRef<Path>, records: &[CanonicalRecord]) -> StoreResult<()> {
    let path = path.as_ref();
    let body = serde_json::to_string_pretty(records).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut staging = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    staging.write_all(body.as_bytes()).map_err(|e| StoreError::io(staging.path(), e))?;
    staging.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    info!("wrote {} canonical rows to {}", records.len(), path.display());
    Ok(())
}
