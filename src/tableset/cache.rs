//! Store persistence keyed by a version stamp
//!
//! The whole table/relation graph is serialized into a single blob together
//! with a version string. On load, only presence and an exact version match
//! count: a missing file or a stale stamp is a non-fatal outcome that sends
//! the caller back to rebuilding from source. A corrupt blob is an error
//! carrying the cause and never leaves a partially restored store behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::store::TableSet;

/// Current version stamp written into saved caches. Bump to invalidate
/// every existing cache file.
pub const TABLE_VERSION: &str = "1.0.0";

#[derive(Serialize)]
struct CacheBlobRef<'a> {
    version: &'a str,
    set: &'a TableSet,
}

#[derive(Deserialize)]
struct CacheBlob {
    version: String,
    set: TableSet,
}

/// Outcome of a cache load.
#[derive(Debug)]
pub enum CacheOutcome {
    /// The cache matched the expected version; all table builds can be
    /// skipped this run.
    Restored(TableSet),
    /// A cache existed but its version stamp differs; rebuild from source.
    Stale,
    /// No cache file at the path; rebuild from source.
    Missing,
}

/// A store cache at a fixed path.
#[derive(Debug, Clone)]
pub struct Cache {
    path: PathBuf,
    version: String,
}

impl Cache {
    /// Cache at `path` expecting the crate's current [`TABLE_VERSION`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Cache {
            path: path.into(),
            version: TABLE_VERSION.to_string(),
        }
    }

    /// Cache expecting an explicit version stamp.
    pub fn with_version(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Cache {
            path: path.into(),
            version: version.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to restore a previously saved store.
    ///
    /// Returns [`CacheOutcome::Stale`] on a version mismatch and
    /// [`CacheOutcome::Missing`] when no file exists; both mean the caller
    /// repopulates an empty store from source. A blob that cannot be
    /// deserialized is an error carrying the cause.
    pub fn load(&self) -> Result<CacheOutcome> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no cache file");
            return Ok(CacheOutcome::Missing);
        }

        let bytes = fs::read(&self.path)?;
        let blob: CacheBlob = bincode::deserialize(&bytes).map_err(|e| {
            Error::Cache(format!(
                "corrupt cache blob {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if blob.version != self.version {
            warn!(
                path = %self.path.display(),
                found = %blob.version,
                expected = %self.version,
                "cache is stale and must be regenerated"
            );
            return Ok(CacheOutcome::Stale);
        }

        debug!(
            path = %self.path.display(),
            tables = blob.set.table_count(),
            "restored table store from cache"
        );
        Ok(CacheOutcome::Restored(blob.set))
    }

    /// Persist the store and the expected version stamp.
    ///
    /// Creates missing parent directories, writes to a temporary sibling
    /// file, then renames it into place so a crash never leaves a torn
    /// cache.
    pub fn save(&self, set: &TableSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let blob = CacheBlobRef {
            version: &self.version,
            set,
        };
        let bytes = bincode::serialize(&blob)
            .map_err(|e| Error::Cache(format!("failed to serialize table store: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            tables = set.table_count(),
            "saved table store cache"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use crate::record::{Record, Value};
    use crate::schema::{FieldKind, FieldLayout, RecordSchema};
    use crate::tableset::StringLookups;

    fn populated_set() -> TableSet {
        let schema = RecordSchema::new(
            "items",
            vec![
                FieldLayout::new("code", FieldKind::Int32),
                FieldLayout::new("name", FieldKind::Str(8)),
            ],
        );
        let mut set = TableSet::new();
        set.load_table(
            &schema,
            &[
                Record::new(vec![Value::Int32(1), Value::Str("sword".into())]),
                Record::new(vec![Value::Int32(2), Value::Str("axe".into())]),
            ],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        set.set_table_code(3, "items");
        set
    }

    #[test]
    fn test_save_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("nested").join("tables.cache"));

        cache.save(&populated_set()).unwrap();
        match cache.load().unwrap() {
            CacheOutcome::Restored(set) => {
                let table = set.get_table("items").unwrap();
                assert_eq!(table.row_count(), 2);
                assert_eq!(table.value(1, "name").unwrap().as_str(), Some("axe"));
                assert_eq!(set.table_by_code(3).unwrap().name(), "items");
            }
            other => panic!("expected Restored, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("absent.cache"));
        assert!(matches!(cache.load().unwrap(), CacheOutcome::Missing));
    }

    #[test]
    fn test_stale_version_never_restores_partially() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.cache");

        Cache::with_version(&path, "0.9.0")
            .save(&populated_set())
            .unwrap();
        let outcome = Cache::with_version(&path, "1.0.0").load().unwrap();
        assert!(matches!(outcome, CacheOutcome::Stale));
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.cache");
        fs::write(&path, b"not a cache blob").unwrap();

        assert!(matches!(
            Cache::new(&path).load(),
            Err(Error::Cache(_))
        ));
    }
}
