// CoursePulse - app/snapshot.rs
//
// Load-once snapshots of the offerings table, cached by content fingerprint.
//
// A snapshot is immutable once built. Reloading an unchanged file returns
// the cached snapshot; any content change produces a brand-new snapshot and
// every structure derived from the old one must be rebuilt by the caller.

use crate::core::ingest;
use crate::core::model::TrainingOffering;
use crate::platform::fs;
use crate::util::error::{CoursePulseError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable, shareable view of one version of the source table.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    /// File the snapshot was read from.
    pub source: PathBuf,

    /// Hex SHA-256 of the file bytes.
    pub fingerprint: String,

    /// When the table was decoded.
    pub loaded_at: DateTime<Utc>,

    /// Decoded offerings. Shared, never mutated.
    pub offerings: Arc<[TrainingOffering]>,
}

impl DatasetSnapshot {
    /// Decode a snapshot from raw file bytes.
    pub fn from_bytes(source: &Path, bytes: &[u8]) -> Result<Self> {
        let offerings = ingest::load_offerings(bytes)?;
        Ok(Self {
            source: source.to_path_buf(),
            fingerprint: fs::fingerprint(bytes),
            loaded_at: Utc::now(),
            offerings: offerings.into(),
        })
    }

    /// True if both snapshots hold the same table version.
    pub fn same_version(&self, other: &DatasetSnapshot) -> bool {
        self.fingerprint == other.fingerprint
    }
}

/// How a `SnapshotCache::load` call was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Nothing was cached for this path; the table was decoded.
    Loaded,
    /// Contents unchanged; the cached snapshot was returned.
    Hit,
    /// Contents changed; the old snapshot was dropped and the table decoded.
    Invalidated,
}

/// Single-entry cache of the most recently loaded snapshot.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: Option<DatasetSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot, if any.
    pub fn current(&self) -> Option<&DatasetSnapshot> {
        self.current.as_ref()
    }

    /// Drop the cached snapshot so the next load decodes from scratch.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Load `path`, reusing the cached snapshot when the bytes are unchanged.
    ///
    /// The file is always read and fingerprinted; only decoding is skipped on
    /// a hit. On a schema error the previous snapshot stays cached.
    pub fn load(&mut self, path: &Path) -> Result<(DatasetSnapshot, CacheOutcome)> {
        let bytes = fs::read_bytes(path).map_err(|e| CoursePulseError::Io {
            path: path.to_path_buf(),
            operation: "read offerings table",
            source: e,
        })?;
        let fingerprint = fs::fingerprint(&bytes);

        let outcome = match &self.current {
            Some(cached) if cached.source == path && cached.fingerprint == fingerprint => {
                tracing::debug!(path = %path.display(), "Snapshot cache hit");
                return Ok((cached.clone(), CacheOutcome::Hit));
            }
            Some(cached) if cached.source == path => CacheOutcome::Invalidated,
            _ => CacheOutcome::Loaded,
        };

        let snapshot = DatasetSnapshot::from_bytes(path, &bytes)?;
        match outcome {
            CacheOutcome::Invalidated => tracing::info!(
                path = %path.display(),
                fingerprint = %snapshot.fingerprint,
                offerings = snapshot.offerings.len(),
                "Source changed; snapshot reloaded"
            ),
            _ => tracing::info!(
                path = %path.display(),
                fingerprint = %snapshot.fingerprint,
                offerings = snapshot.offerings.len(),
                "Snapshot loaded"
            ),
        }

        self.current = Some(snapshot.clone());
        Ok((snapshot, outcome))
    }
}
