use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError}
};

use lazy_static::lazy_static;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::archive_structs::Snapshot;
use crate::utils::fs_utils::WriteBatch;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error
    },

    #[error("No snapshots found in {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    #[error("Failed to serialize snapshot data: {0}")]
    Serialization(#[from] serde_json::Error)
}

lazy_static! {
    // Appends are read-modify-write on the whole file, so two appends to the
    // same path must never interleave within this process.
    static ref APPEND_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

/// The canonical parent joined with the file name, so every spelling of one archive
/// shares a lock. The parent directory must exist.
fn lock_key(path: &Path) -> io::Result<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new(".")
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name"))?;

    Ok(fs::canonicalize(parent)?.join(name))
}

fn path_lock(key: PathBuf) -> Arc<Mutex<()>> {
    let mut locks = APPEND_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.entry(key).or_default().clone()
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Returns every snapshot in the archive at `path`, in file order.
/// A missing file is an empty archive; an unparseable one is an error.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<Snapshot<T>>, ArchiveError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path)(e))
    };

    serde_json::from_str(&contents).map_err(|source| ArchiveError::Corrupt {
        path: path.to_path_buf(),
        source
    })
}

/// Appends `{timestamp, data}` to the archive at `path` and returns the new snapshot count.
///
/// The whole array is rewritten through a temp file and rename. An existing archive that
/// fails to parse aborts the append and is left untouched.
pub fn append<T: Serialize + ?Sized>(path: &Path, timestamp: f64, data: &T) -> Result<usize, ArchiveError> {
    append_with(path, timestamp, data, WriteBatch::new())
}

/// Like [`append`], but commits the snapshot together with the files in `batch`:
/// either all of them are replaced or none is.
pub fn append_with<T: Serialize + ?Sized>(
    path: &Path,
    timestamp: f64,
    data: &T,
    batch: WriteBatch
) -> Result<usize, ArchiveError> {
    let data = serde_json::to_value(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let lock = path_lock(lock_key(path).map_err(io_error(path))?);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut snapshots: Vec<Snapshot<Value>> = read_all(path)?;
    snapshots.push(Snapshot { timestamp, data });
    let bytes = serde_json::to_vec_pretty(&snapshots)?;

    let mut writes = WriteBatch::new();
    writes.add(path, bytes);
    writes.extend(batch);
    writes
        .commit()
        .map_err(|(failed, source)| ArchiveError::Io { path: failed, source })?;

    debug!(path = %path.display(), snapshots = snapshots.len(), "Appended snapshot");
    Ok(snapshots.len())
}

fn closest_index<T>(snapshots: &[Snapshot<T>], target: f64) -> Option<usize> {
    snapshots
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.timestamp - target).abs().total_cmp(&(b.timestamp - target).abs()))
        .map(|(i, _)| i)
}

fn latest_index<T>(snapshots: &[Snapshot<T>]) -> Option<usize> {
    snapshots
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.timestamp.total_cmp(&b.timestamp))
        .map(|(i, _)| i)
}

/// The snapshot whose timestamp is nearest to `target`. The earlier one wins a tie.
pub fn closest<T>(snapshots: &[Snapshot<T>], target: f64) -> Option<&Snapshot<T>> {
    closest_index(snapshots, target).map(|i| &snapshots[i])
}

/// The snapshot with the greatest timestamp, regardless of its position in the file.
pub fn latest<T>(snapshots: &[Snapshot<T>]) -> Option<&Snapshot<T>> {
    latest_index(snapshots).map(|i| &snapshots[i])
}

pub fn read_closest<T: DeserializeOwned>(path: &Path, target: f64) -> Result<Snapshot<T>, ArchiveError> {
    let mut snapshots = read_all::<T>(path)?;
    let index = closest_index(&snapshots, target).ok_or_else(|| ArchiveError::NotFound {
        path: path.to_path_buf()
    })?;

    Ok(snapshots.swap_remove(index))
}

pub fn read_latest<T: DeserializeOwned>(path: &Path) -> Result<Snapshot<T>, ArchiveError> {
    let mut snapshots = read_all::<T>(path)?;
    let index = latest_index(&snapshots).ok_or_else(|| ArchiveError::NotFound {
        path: path.to_path_buf()
    })?;

    Ok(snapshots.swap_remove(index))
}
