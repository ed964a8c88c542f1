use std::collections::HashMap;

use tracing::debug;

use crate::model::structures::score_record::ScoreRecord;

/// Maximum submitted version per level, computed over one batch of records.
#[derive(Debug, Clone, Default)]
pub struct LevelVersionIndex {
    max_versions: HashMap<String, u32>
}

impl LevelVersionIndex {
    pub fn build(records: &[ScoreRecord]) -> LevelVersionIndex {
        let mut max_versions: HashMap<String, u32> = HashMap::new();

        for record in records {
            let version = max_versions.entry(record.level_id.clone()).or_default();
            if record.level_version > *version {
                *version = record.level_version;
            }
        }

        LevelVersionIndex { max_versions }
    }

    /// Returns the maximum version seen for `level_id`, or 0 if the level never appeared.
    pub fn max_version(&self, level_id: &str) -> u32 {
        self.max_versions.get(level_id).copied().unwrap_or(0)
    }

    pub fn is_current(&self, record: &ScoreRecord) -> bool {
        record.level_version >= self.max_version(&record.level_id)
    }

    pub fn len(&self) -> usize {
        self.max_versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_versions.is_empty()
    }
}

/// Keeps only the records submitted against the newest version of their level.
///
/// The maximum is batch-local: one record at a higher version than everything
/// else invalidates the rest of that level's records.
pub fn resolve_current(records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    let index = LevelVersionIndex::build(&records);
    let before = records.len();

    let current: Vec<ScoreRecord> = records.into_iter().filter(|r| index.is_current(r)).collect();

    debug!(
        levels = index.len(),
        kept = current.len(),
        discarded = before - current.len(),
        "Resolved current level versions"
    );

    current
}
