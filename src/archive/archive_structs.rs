use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// One timestamped result of a single run, as stored in a month archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Unix epoch seconds
    pub timestamp: f64,
    pub data: T
}

/// The families of month-scoped archives kept under the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ArchiveCategory {
    MonthlyLeaderboard,
    SpeedrunLeaderboard,
    XpLeaderboard,
    BlitzLeaderboard,
    Quests,
    LevelSelection
}

impl ArchiveCategory {
    /// Directory relative to the storage root
    pub fn dir(&self) -> &'static str {
        match self {
            ArchiveCategory::MonthlyLeaderboard => "monthly_leaderboard_daily/archive",
            ArchiveCategory::SpeedrunLeaderboard => "speedrun_lb_daily/archive",
            ArchiveCategory::XpLeaderboard => "xp_lb_archive",
            ArchiveCategory::BlitzLeaderboard => "blitz_lb_archive",
            ArchiveCategory::Quests => "quests_archive",
            ArchiveCategory::LevelSelection => "monthly_leaderboard_monthly/archive"
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            ArchiveCategory::MonthlyLeaderboard => "monthly_lb",
            ArchiveCategory::SpeedrunLeaderboard => "speedrun_lb_daily",
            ArchiveCategory::XpLeaderboard => "xp_lb",
            ArchiveCategory::BlitzLeaderboard => "blitz_lb",
            ArchiveCategory::Quests => "quests",
            ArchiveCategory::LevelSelection => "levels"
        }
    }

    /// `{prefix}_{MM}_{YYYY}.json`
    pub fn file_name(&self, month: u32, year: i32) -> String {
        format!("{}_{:02}_{}.json", self.file_prefix(), month, year)
    }

    /// `{prefix}_{M}_{YYYY}.json`, the unpadded name older runs wrote
    pub fn legacy_file_name(&self, month: u32, year: i32) -> String {
        format!("{}_{}_{}.json", self.file_prefix(), month, year)
    }

    /// Inverse of [`ArchiveCategory::file_name`] and [`ArchiveCategory::legacy_file_name`]. Returns `(month, year)`.
    pub fn parse_file_name(&self, file_name: &str) -> Option<(u32, i32)> {
        let rest = file_name.strip_prefix(self.file_prefix())?.strip_prefix('_')?;
        let rest = rest.strip_suffix(".json")?;
        let (month, year) = rest.split_once('_')?;

        let month: u32 = month.parse().ok()?;
        let year: i32 = year.parse().ok()?;

        (1..=12).contains(&month).then_some((month, year))
    }
}
