use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf}
};

use tracing::warn;

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Writes `contents` to the temp sibling of `path`, creating parent directories.
fn stage(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(temp_path(path))?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Writes `contents` to a sibling temp file, syncs it and renames it over `path`.
/// Readers observe either the previous contents or the new contents, never a partial write.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    stage(path, contents)?;
    fs::rename(temp_path(path), path)
}

fn read_existing(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
    }
}

fn discard_staged(path: &Path) {
    let _ = fs::remove_file(temp_path(path));
}

fn restore(path: &Path, previous: Option<&[u8]>) {
    let result = match previous {
        Some(bytes) => atomic_write(path, bytes),
        None => fs::remove_file(path)
    };

    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Failed to roll back write");
    }
}

/// A set of files replaced together.
///
/// Current contents are read first, then every file is staged to its temp sibling, and
/// only then renamed into place. A failure before the first rename changes nothing; a
/// failed rename puts the previous contents of the files already replaced back.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<(PathBuf, Vec<u8>)>
}

impl WriteBatch {
    pub fn new() -> WriteBatch {
        WriteBatch::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, contents: Vec<u8>) {
        self.writes.push((path.into(), contents));
    }

    /// Appends every write of `other` after the writes already queued.
    pub fn extend(&mut self, other: WriteBatch) {
        self.writes.extend(other.writes);
    }

    /// On failure returns the path that could not be written.
    pub fn commit(self) -> Result<(), (PathBuf, io::Error)> {
        let mut previous = Vec::with_capacity(self.writes.len());
        for (path, _) in &self.writes {
            previous.push(read_existing(path).map_err(|e| (path.clone(), e))?);
        }

        for (idx, (path, contents)) in self.writes.iter().enumerate() {
            if let Err(e) = stage(path, contents) {
                for (staged, _) in &self.writes[..=idx] {
                    discard_staged(staged);
                }
                return Err((path.clone(), e));
            }
        }

        for (idx, (path, _)) in self.writes.iter().enumerate() {
            if let Err(e) = fs::rename(temp_path(path), path) {
                for ((done, _), before) in self.writes[..idx].iter().zip(&previous) {
                    restore(done, before.as_deref());
                }
                for (pending, _) in &self.writes[idx..] {
                    discard_staged(pending);
                }
                return Err((path.clone(), e));
            }
        }

        Ok(())
    }
}

/// Reads non-empty, trimmed lines. A missing file yields no lines.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e)
    }
}

/// One line per entry, each newline-terminated.
pub fn lines_to_bytes(lines: &[String]) -> Vec<u8> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    contents.into_bytes()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{atomic_write, lines_to_bytes, read_lines, WriteBatch};

    #[test]
    fn test_atomic_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("nested").join("file.txt.tmp").exists());
    }

    #[test]
    fn test_lines_round_trip_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.txt");

        std::fs::write(&path, "a\n\n  b  \nc\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b", "c"]);

        atomic_write(&path, &lines_to_bytes(&["x".to_string(), "y".to_string()])).unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["x", "y"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\ny\n");
    }

    #[test]
    fn test_missing_file_has_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_lines(&dir.path().join("absent.txt")).unwrap().is_empty());
    }

    #[test]
    fn test_write_batch_replaces_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("nested").join("second.txt");
        fs::write(&first, "old").unwrap();

        let mut batch = WriteBatch::new();
        batch.add(&first, b"new".to_vec());
        batch.add(&second, b"fresh".to_vec());
        batch.commit().unwrap();

        assert_eq!(fs::read_to_string(&first).unwrap(), "new");
        assert_eq!(fs::read_to_string(&second).unwrap(), "fresh");
        assert!(!dir.path().join("first.txt.tmp").exists());
    }

    #[test]
    fn test_write_batch_failing_stage_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "old").unwrap();
        // A directory squatting on the temp name makes staging fail
        fs::create_dir_all(dir.path().join("second.txt.tmp").join("x")).unwrap();

        let mut batch = WriteBatch::new();
        batch.add(&first, b"new".to_vec());
        batch.add(&second, b"fresh".to_vec());
        let (failed, _) = batch.commit().unwrap_err();

        assert_eq!(failed, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "old");
        assert!(!second.exists());
        assert!(!dir.path().join("first.txt.tmp").exists());
    }

    #[test]
    fn test_write_batch_unreadable_target_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::create_dir_all(second.join("x")).unwrap();

        let mut batch = WriteBatch::new();
        batch.add(&first, b"new".to_vec());
        batch.add(&second, b"fresh".to_vec());

        assert!(batch.commit().is_err());
        assert!(!first.exists());
    }
}
