use serde::{Deserialize, Serialize};

/// One row of the standard (position table) leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardEntry {
    pub player_uuid: String,
    pub country: String,
    /// Sum of awarded points across all ranked levels
    pub score: i64,
    /// Number of levels the player holds rank 1 on
    pub wrs: u32,
    /// Mean placement, rounded to 4 decimals
    pub average_place: f64
}

/// One row of the speedrun leaderboard. Bucket totals are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpeedrunEntry {
    pub player_uuid: String,
    pub country: String,
    pub score_1p_official: f64,
    pub score_2p_official: f64,
    pub score_1p_community: f64,
    pub score_2p_community: f64
}

impl SpeedrunEntry {
    pub fn total(&self) -> f64 {
        self.score_1p_official + self.score_2p_official + self.score_1p_community + self.score_2p_community
    }
}
