use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, TagShelfError};
use crate::snapshot::Snapshot;

#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    /// Reads the persisted snapshot. A store that has never been saved
    /// yields an empty snapshot.
    async fn load(&self) -> Result<Snapshot>;
    /// Replaces the persisted snapshot with `snapshot` in full.
    async fn save(&self, snapshot: Snapshot) -> Result<()>;
    /// Moves unreadable data out of the way, returning where it went.
    async fn quarantine(&self) -> Result<Option<PathBuf>>;
}

/// Keeps the snapshot as one JSON file.
///
/// Writes go to a temporary file first and are renamed over the data file,
/// so the data file is always either the previous or the new snapshot.
/// Writers are serialized; a write that has started finishes even if the
/// caller stops waiting for it.
pub struct FileSnapshotStore {
    path: PathBuf,
    staging_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSnapshotStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: config.data_file(),
            staging_dir: config.staging_dir().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Snapshot> {
        let path = self.path.clone();
        let snapshot = spawn_blocking(move || read_snapshot(&path))
            .await
            .map_err(join_error)??;
        info!(
            path = %self.path.display(),
            tags = snapshot.tags.len(),
            tracks = snapshot.track_cache.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: Snapshot) -> Result<()> {
        let guard = self.write_lock.clone().lock_owned().await;
        let path = self.path.clone();
        let staging = self.staging_dir.clone();
        spawn_blocking(move || {
            let _guard = guard;
            write_snapshot(&path, &staging, &snapshot)
        })
        .await
        .map_err(join_error)??;
        info!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    async fn quarantine(&self) -> Result<Option<PathBuf>> {
        let guard = self.write_lock.clone().lock_owned().await;
        let path = self.path.clone();
        let moved = spawn_blocking(move || {
            let _guard = guard;
            move_aside(&path)
        })
        .await
        .map_err(join_error)??;
        if let Some(target) = &moved {
            warn!(
                from = %self.path.display(),
                to = %target.display(),
                "unreadable snapshot moved aside"
            );
        }
        Ok(moved)
    }
}

fn join_error(err: JoinError) -> TagShelfError {
    TagShelfError::Persistence(format!("task join error: {err}"))
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot on disk");
            return Ok(Snapshot::default());
        }
        Err(err) => return Err(err.into()),
    };
    serde_json::from_slice(&bytes).map_err(|source| TagShelfError::CorruptData {
        path: path.to_path_buf(),
        source,
    })
}

fn write_snapshot(path: &Path, staging: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| TagShelfError::Persistence(format!("unable to encode snapshot: {err}")))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = NamedTempFile::new_in(staging)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| TagShelfError::Io(err.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

fn move_aside(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    let mut target = path.with_file_name(format!("{name}.corrupt-{stamp}"));
    let mut attempt = 1;
    while target.exists() {
        target = path.with_file_name(format!("{name}.corrupt-{stamp}-{attempt}"));
        attempt += 1;
    }
    fs::rename(path, &target)?;
    Ok(Some(target))
}
