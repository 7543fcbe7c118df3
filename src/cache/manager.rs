//! Persistent cache for normalized API data
//!
//! Provides a `LocalCache` that stores serializable data as JSON files so the
//! reader can paint instantly on the next launch. Records carry the time they
//! were written but never expire on their own; freshness is the job of the
//! revalidation policy in [`crate::screens`].

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Prefix for every record file, so the cache directory can be shared
pub const DEFAULT_NAMESPACE: &str = "boldeast_cache";

/// Sequence for temp-file names; overlapping writers never share one
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk layout of a record
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord<T> {
    data: T,
    timestamp: DateTime<Utc>,
}

/// A record read back from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord<T> {
    pub data: T,
    /// When the record was written
    pub timestamp: DateTime<Utc>,
}

/// Reads and writes cache records on disk
///
/// Each key maps to `{namespace}_{key}.json` inside the cache directory
/// (`~/.cache/boldeast/` on Linux). Reads never fail and writes never
/// surface errors: a broken cache behaves like an empty one.
#[derive(Debug, Clone)]
pub struct LocalCache {
    cache_dir: PathBuf,
    namespace: String,
}

impl LocalCache {
    /// Creates a LocalCache using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "boldeast")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a LocalCache with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Uses a different key namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}_{}.json", self.namespace, key))
    }

    /// Reads the record stored under `key`
    ///
    /// Missing files, unreadable files and corrupt JSON all read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<LocalRecord<T>> {
        let path = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read cache record");
                return None;
            }
        };

        match serde_json::from_str::<StoredRecord<T>>(&content) {
            Ok(record) => Some(LocalRecord {
                data: record.data,
                timestamp: record.timestamp,
            }),
            Err(err) => {
                warn!(key, error = %err, "ignoring corrupt cache record");
                None
            }
        }
    }

    /// Stores `data` under `key` with the current time
    ///
    /// Best effort: failures are logged and otherwise ignored.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        match self.try_set(key, data) {
            Ok(()) => debug!(key, "persisted cache record"),
            Err(err) => warn!(key, error = %err, "failed to persist cache record"),
        }
    }

    /// Deletes the record under `key`, if any
    pub fn remove(&self, key: &str) {
        if let Err(err) = fs::remove_file(self.record_path(key)) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(key, error = %err, "failed to remove cache record");
            }
        }
    }

    /// Writes the record to a temp file and renames it into place, so a
    /// reader sees either the old record or the new one.
    fn try_set<T: Serialize>(&self, key: &str, data: &T) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let record = StoredRecord {
            data,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let path = self.record_path(key);
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }
}
