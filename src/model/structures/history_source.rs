use strum_macros::{Display, EnumIter};

use crate::archive::ArchiveCategory;

/// Raw leaderboard feeds whose archives are replayed into player change logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HistorySource {
    Xp,
    Blitz
}

impl HistorySource {
    pub fn archive_category(&self) -> ArchiveCategory {
        match self {
            HistorySource::Xp => ArchiveCategory::XpLeaderboard,
            HistorySource::Blitz => ArchiveCategory::BlitzLeaderboard
        }
    }
}
