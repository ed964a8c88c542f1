use std::{
    fs, io,
    path::PathBuf
};

use chrono::{DateTime, Datelike, TimeZone};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use super::{
    archive_structs::{ArchiveCategory, Snapshot},
    snapshot_file::{self, ArchiveError}
};
use crate::utils::fs_utils::WriteBatch;

/// Epoch seconds with sub-second precision
pub fn epoch_seconds<Tz: TimeZone>(at: &DateTime<Tz>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// One archive file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub month: u32,
    pub year: i32,
    pub path: PathBuf
}

/// Month-addressed archives under one storage root.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> ArchiveStore {
        ArchiveStore { root: root.into() }
    }

    pub fn category_dir(&self, category: ArchiveCategory) -> PathBuf {
        self.root.join(category.dir())
    }

    /// The archive file of a month. Months first written under the unpadded
    /// legacy name (`monthly_lb_3_2026.json`) keep using that file.
    pub fn path(&self, category: ArchiveCategory, month: u32, year: i32) -> PathBuf {
        let dir = self.category_dir(category);
        let padded = dir.join(category.file_name(month, year));
        if padded.exists() {
            return padded;
        }

        let legacy = dir.join(category.legacy_file_name(month, year));
        if legacy.exists() {
            legacy
        } else {
            padded
        }
    }

    /// The archive file a run at wall-clock time `at` writes to.
    pub fn path_at<Tz: TimeZone>(&self, category: ArchiveCategory, at: &DateTime<Tz>) -> PathBuf {
        self.path(category, at.month(), at.year())
    }

    /// Appends `data` to the month archive for `at`, stamped with `at`.
    pub fn append_at<Tz: TimeZone, T: Serialize + ?Sized>(
        &self,
        category: ArchiveCategory,
        at: &DateTime<Tz>,
        data: &T
    ) -> Result<PathBuf, ArchiveError> {
        self.append_at_with(category, at, data, WriteBatch::new())
    }

    /// Appends `data` like [`ArchiveStore::append_at`] and replaces the files of `batch`
    /// in the same commit.
    pub fn append_at_with<Tz: TimeZone, T: Serialize + ?Sized>(
        &self,
        category: ArchiveCategory,
        at: &DateTime<Tz>,
        data: &T,
        batch: WriteBatch
    ) -> Result<PathBuf, ArchiveError> {
        let path = self.path_at(category, at);
        let count = snapshot_file::append_with(&path, epoch_seconds(at), data, batch)?;

        info!(category = %category, path = %path.display(), snapshots = count, "Archived snapshot");
        Ok(path)
    }

    pub fn read_month<T: DeserializeOwned>(
        &self,
        category: ArchiveCategory,
        month: u32,
        year: i32
    ) -> Result<Vec<Snapshot<T>>, ArchiveError> {
        snapshot_file::read_all(&self.path(category, month, year))
    }

    pub fn read_closest<T: DeserializeOwned>(
        &self,
        category: ArchiveCategory,
        month: u32,
        year: i32,
        target: f64
    ) -> Result<Snapshot<T>, ArchiveError> {
        snapshot_file::read_closest(&self.path(category, month, year), target)
    }

    pub fn read_latest<T: DeserializeOwned>(
        &self,
        category: ArchiveCategory,
        month: u32,
        year: i32
    ) -> Result<Snapshot<T>, ArchiveError> {
        snapshot_file::read_latest(&self.path(category, month, year))
    }

    /// Every archive file of `category` as found on disk, oldest month first.
    pub fn files(&self, category: ArchiveCategory) -> Result<Vec<ArchiveFile>, ArchiveError> {
        let dir = self.category_dir(category);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ArchiveError::Io { path: dir, source })
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ArchiveError::Io {
                path: dir.clone(),
                source
            })?;

            if let Some((month, year)) = entry.file_name().to_str().and_then(|n| category.parse_file_name(n)) {
                files.push(ArchiveFile {
                    month,
                    year,
                    path: entry.path()
                });
            }
        }

        Ok(files
            .into_iter()
            .sorted_by(|a, b| (a.year, a.month, &a.path).cmp(&(b.year, b.month, &b.path)))
            .collect())
    }

    /// `(month, year)` of every month with an archive file, oldest first.
    pub fn months(&self, category: ArchiveCategory) -> Result<Vec<(u32, i32)>, ArchiveError> {
        Ok(self
            .files(category)?
            .into_iter()
            .map(|f| (f.month, f.year))
            .dedup()
            .collect())
    }

    /// Every snapshot of `category` across all files, ordered by timestamp.
    /// Snapshots sharing a timestamp keep their file order.
    pub fn read_category<T: DeserializeOwned>(&self, category: ArchiveCategory) -> Result<Vec<Snapshot<T>>, ArchiveError> {
        let mut snapshots = Vec::new();
        for file in self.files(category)? {
            snapshots.extend(snapshot_file::read_all::<T>(&file.path)?);
        }

        snapshots.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone, Utc};
    use serde_json::{json, Value};

    use super::{epoch_seconds, ArchiveStore};
    use crate::archive::{snapshot_file, ArchiveCategory};

    #[test]
    fn test_path_addressed_by_month() {
        let store = ArchiveStore::new("/storage");
        let at = Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap();

        assert_eq!(
            store.path_at(ArchiveCategory::MonthlyLeaderboard, &at),
            std::path::PathBuf::from("/storage/monthly_leaderboard_daily/archive/monthly_lb_02_2026.json")
        );
    }

    #[test]
    fn test_epoch_seconds_keeps_fraction() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        assert_eq!(epoch_seconds(&at), 1_700_000_000.25);
    }

    #[test]
    fn test_append_at_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let at = Local.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap();

        let path = store.append_at(ArchiveCategory::Quests, &at, &json!([{"id": 1}])).unwrap();
        assert!(path.ends_with("quests_archive/quests_05_2026.json"));

        let latest = store.read_latest::<Value>(ArchiveCategory::Quests, 5, 2026).unwrap();
        assert_eq!(latest.timestamp, epoch_seconds(&at));
        assert_eq!(latest.data[0]["id"], 1);
    }

    #[test]
    fn test_months_sorted_chronologically() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());

        for (month, year) in [(1, 2026), (12, 2025), (3, 2025)] {
            snapshot_file::append(&store.path(ArchiveCategory::XpLeaderboard, month, year), 1.0, &json!([])).unwrap();
        }
        std::fs::write(store.category_dir(ArchiveCategory::XpLeaderboard).join("notes.txt"), "x").unwrap();

        assert_eq!(
            store.months(ArchiveCategory::XpLeaderboard).unwrap(),
            vec![(3, 2025), (12, 2025), (1, 2026)]
        );
        assert!(store.months(ArchiveCategory::BlitzLeaderboard).unwrap().is_empty());
    }

    #[test]
    fn test_read_category_orders_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let category = ArchiveCategory::BlitzLeaderboard;

        snapshot_file::append(&store.path(category, 1, 2026), 300.0, &"jan").unwrap();
        snapshot_file::append(&store.path(category, 12, 2025), 100.0, &"dec-a").unwrap();
        snapshot_file::append(&store.path(category, 12, 2025), 200.0, &"dec-b").unwrap();

        let all = store.read_category::<String>(category).unwrap();
        let data: Vec<&str> = all.iter().map(|s| s.data.as_str()).collect();

        assert_eq!(data, vec!["dec-a", "dec-b", "jan"]);
    }

    #[test]
    fn test_unpadded_legacy_month_is_read_and_extended() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let category = ArchiveCategory::MonthlyLeaderboard;
        let legacy = store.category_dir(category).join("monthly_lb_3_2026.json");
        snapshot_file::append(&legacy, 100.0, &"legacy").unwrap();

        assert_eq!(store.months(category).unwrap(), vec![(3, 2026)]);
        assert_eq!(store.read_month::<String>(category, 3, 2026).unwrap().len(), 1);
        assert_eq!(store.read_category::<String>(category).unwrap().len(), 1);

        let at = Local.with_ymd_and_hms(2026, 3, 20, 8, 0, 0).unwrap();
        assert_eq!(store.append_at(category, &at, &"new").unwrap(), legacy);

        let data: Vec<String> = store
            .read_month::<String>(category, 3, 2026)
            .unwrap()
            .into_iter()
            .map(|s| s.data)
            .collect();
        assert_eq!(data, vec!["legacy", "new"]);
        assert!(!store.category_dir(category).join("monthly_lb_03_2026.json").exists());
    }

    #[test]
    fn test_padded_and_legacy_files_of_one_month_are_both_replayed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let category = ArchiveCategory::XpLeaderboard;
        let category_dir = store.category_dir(category);
        snapshot_file::append(&category_dir.join("xp_lb_4_2026.json"), 2.0, &"legacy").unwrap();
        snapshot_file::append(&category_dir.join("xp_lb_04_2026.json"), 1.0, &"padded").unwrap();

        assert_eq!(store.months(category).unwrap(), vec![(4, 2026)]);
        assert_eq!(store.files(category).unwrap().len(), 2);

        let data: Vec<String> = store
            .read_category::<String>(category)
            .unwrap()
            .into_iter()
            .map(|s| s.data)
            .collect();
        assert_eq!(data, vec!["padded", "legacy"]);
    }
}
