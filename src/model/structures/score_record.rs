use serde::{Deserialize, Serialize};

use super::value_type::ValueType;

/// A single validated row of the score feed. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub level_id: String,
    pub level_version: u32,
    /// One id for solo runs, two for co-op
    pub player_ids: Vec<String>,
    pub value: i64,
    pub value_type: ValueType,
    /// Ordinal submission date, earlier wins ties
    pub submitted_at: i64,
    pub country: String
}

impl ScoreRecord {
    pub fn is_coop(&self) -> bool {
        self.player_ids.len() > 1
    }

    /// The key a standard score is credited to: the account ids joined the same
    /// way the feed encodes them.
    pub fn entrant(&self) -> String {
        self.player_ids.join("|")
    }
}
