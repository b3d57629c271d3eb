// ── On-disk problem snapshots ──
//
// One JSON file per server id, replaced wholesale on every successful
// fetch. The cache is purely an availability layer: readers treat its
// content as advisory, so a missing or corrupt file loads as the empty
// snapshot and only writes surface errors.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Problem, ServerId};

/// The cached problem set for one server, plus when it was fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Fetch time; `None` only for the empty snapshot.
    pub fetched_at: Option<DateTime<Utc>>,
    pub problems: Vec<Problem>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Server-keyed snapshot store under a single directory.
///
/// Writes go through a temp file and rename, so readers in other
/// processes never observe a half-written snapshot. Concurrent writers
/// race as last-write-wins, which is fine for whole-value replacement.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, server_id: ServerId) -> PathBuf {
        self.dir.join(format!("problems_{server_id}.json"))
    }

    /// Replace the snapshot for `server_id`, stamping the fetch time.
    pub fn save(&self, server_id: ServerId, problems: &[Problem]) -> Result<(), CoreError> {
        let snapshot = Snapshot {
            fetched_at: Some(Utc::now()),
            problems: problems.to_vec(),
        };
        fs::create_dir_all(&self.dir).map_err(|e| write_error(&self.dir, &e))?;

        let path = self.path_for(server_id);
        let json = serde_json::to_vec(&snapshot)
            .map_err(|e| CoreError::Internal(format!("snapshot serialization failed: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| write_error(&tmp, &e))?;
        fs::rename(&tmp, &path).map_err(|e| write_error(&path, &e))?;

        debug!(server_id, problems = snapshot.problems.len(), "snapshot saved");
        Ok(())
    }

    /// Load the snapshot for `server_id`. Absent or corrupt files load
    /// as the empty snapshot.
    #[must_use]
    pub fn load(&self, server_id: ServerId) -> Snapshot {
        let path = self.path_for(server_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!(server_id, error = %e, "snapshot unreadable; treating as empty");
                }
                return Snapshot::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(server_id, error = %e, "corrupt snapshot; treating as empty");
                Snapshot::default()
            }
        }
    }

    /// Drop the snapshot for `server_id`. Clearing an absent snapshot
    /// is a no-op.
    pub fn clear(&self, server_id: ServerId) {
        let path = self.path_for(server_id);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(server_id, error = %e, "failed to clear snapshot");
            }
        } else {
            debug!(server_id, "snapshot cleared");
        }
    }
}

fn write_error(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::CacheWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(eventid: &str) -> Problem {
        Problem {
            eventid: eventid.to_owned(),
            objectid: "10".to_owned(),
            clock: "1700000000".to_owned(),
            name: "CPU load high".to_owned(),
            severity: "3".to_owned(),
            acknowledged: "0".to_owned(),
            suppressed: "0".to_owned(),
            manual_close: "1".to_owned(),
            comments: "threshold 5.0".to_owned(),
            host_name: "web-01".to_owned(),
            tags: vec![crate::model::Tag {
                tag: "env".to_owned(),
                value: "prod".to_owned(),
            }],
        }
    }

    #[test]
    fn snapshots_round_trip_per_server() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        cache.save(1, &[problem("100"), problem("101")]).unwrap();
        cache.save(2, &[problem("200")]).unwrap();

        let first = cache.load(1);
        assert_eq!(first.problems.len(), 2);
        assert_eq!(first.problems[0], problem("100"));
        assert!(first.fetched_at.is_some());

        assert_eq!(cache.load(2).problems.len(), 1);
    }

    #[test]
    fn missing_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let snapshot = cache.load(42);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.fetched_at, None);
    }

    #[test]
    fn corrupt_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("problems_7.json"), b"{not json").unwrap();

        assert!(cache.load(7).is_empty());
    }

    #[test]
    fn save_replaces_the_previous_snapshot_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        cache.save(1, &[problem("100"), problem("101")]).unwrap();
        cache.save(1, &[problem("102")]).unwrap();

        let snapshot = cache.load(1);
        assert_eq!(snapshot.problems.len(), 1);
        assert_eq!(snapshot.problems[0].eventid, "102");
    }

    #[test]
    fn clear_removes_only_the_named_server() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        cache.save(1, &[problem("100")]).unwrap();
        cache.save(2, &[problem("200")]).unwrap();
        cache.clear(1);

        assert!(cache.load(1).is_empty());
        assert_eq!(cache.load(2).problems.len(), 1);
    }

    #[test]
    fn clearing_an_absent_snapshot_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        SnapshotCache::new(dir.path()).clear(99);
    }

    #[test]
    fn save_creates_the_cache_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("cache");
        let cache = SnapshotCache::new(&nested);
        cache.save(1, &[problem("100")]).unwrap();
        assert_eq!(cache.load(1).problems.len(), 1);
    }

    #[test]
    fn empty_problem_list_is_a_valid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache.save(1, &[problem("100")]).unwrap();
        cache.save(1, &[]).unwrap();

        let snapshot = cache.load(1);
        assert!(snapshot.is_empty());
        // Empty-but-fetched is distinct from never-fetched.
        assert!(snapshot.fetched_at.is_some());
    }
}
