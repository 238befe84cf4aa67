//! Immutable snapshot cache for the canonical series
//!
//! The read path never parses the series file per request. The first access
//! loads it into an `Arc<SeriesSnapshot>`; every later access shares that
//! snapshot. [`SnapshotStore::reload`] builds a fresh snapshot and swaps it in,
//! so requests holding the old one finish against consistent data.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::{debug, info};

use wellseries_core::CanonicalRecord;

use crate::{
    errors::{StoreError, StoreResult},
    json::load_canonical,
};

/// A loaded canonical series
#[derive(Debug, Clone, Default)]
pub struct SeriesSnapshot {
    records: Vec<CanonicalRecord>,
    skipped: usize,
}

impl SeriesSnapshot {
    /// Wrap rows already in memory
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        Self { records, skipped: 0 }
    }

    /// Rows in file order
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Row count
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the series holds no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped while loading
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Lazily loaded, atomically replaceable series
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    current: RwLock<Option<Arc<SeriesSnapshot>>>,
}

impl SnapshotStore {
    /// Store backed by a canonical JSON file; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), current: RwLock::new(None) }
    }

    /// Store that starts with an in-memory snapshot
    pub fn with_snapshot(path: impl Into<PathBuf>, snapshot: SeriesSnapshot) -> Self {
        Self { path: path.into(), current: RwLock::new(Some(Arc::new(snapshot))) }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once a snapshot is cached
    pub fn is_loaded(&self) -> bool {
        self.current.read().map(|current| current.is_some()).unwrap_or(false)
    }

    /// Current snapshot, loading it on first use
    pub fn snapshot(&self) -> StoreResult<Arc<SeriesSnapshot>> {
        {
            let current = self.current.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(snapshot) = current.as_ref() {
                return Ok(Arc::clone(snapshot));
            }
        }

        let mut current = self.current.write().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(snapshot) = current.as_ref() {
            debug!("snapshot loaded by a concurrent caller");
            return Ok(Arc::clone(snapshot));
        }
        let snapshot = Arc::new(self.load()?);
        *current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Re-read the backing file and replace the cached snapshot
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> StoreResult<Arc<SeriesSnapshot>> {
        let snapshot = Arc::new(self.load()?);
        let mut current = self.current.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = Some(Arc::clone(&snapshot));
        info!("reloaded {} rows from {}", snapshot.len(), self.path.display());
        Ok(snapshot)
    }

    fn load(&self) -> StoreResult<SeriesSnapshot> {
        let loaded = load_canonical(&self.path)?;
        Ok(SeriesSnapshot { records: loaded.rows, skipped: loaded.skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::write_canonical;
    use wellseries_core::time::parse_naive_iso;

    fn row(ts: &str, p: f64) -> CanonicalRecord {
        CanonicalRecord::new(parse_naive_iso(ts).unwrap(), 1, 0).with_sensor("p_pdg", p)
    }

    #[test]
    fn loads_once_and_reload_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        write_canonical(&path, &[row("2024-01-01T00:00:00", 1.0)]).unwrap();

        let store = SnapshotStore::new(&path);
        assert!(!store.is_loaded());
        let first = store.snapshot().unwrap();
        assert_eq!(first.len(), 1);

        write_canonical(&path, &[row("2024-01-01T00:00:00", 1.0), row("2024-01-01T00:01:00", 2.0)]).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 1);

        let second = store.reload().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&second, &store.snapshot().unwrap()));
    }

    #[test]
    fn failed_reload_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        write_canonical(&path, &[row("2024-01-01T00:00:00", 1.0)]).unwrap();

        let store = SnapshotStore::new(&path);
        store.snapshot().unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(store.reload(), Err(StoreError::Malformed { .. })));
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.snapshot(), Err(StoreError::NotFound(_))));
        assert!(!store.is_loaded());
    }
}
