use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    model::{
        constants::{
            AVERAGE_PLACE_DECIMALS, PODIUM_BASE, PODIUM_LAST_RANK, PODIUM_STEP, STANDARD_TOP_N, TAIL_BASE, TAIL_STEP,
            TOP_TEN_BASE, TOP_TEN_LAST_RANK, TOP_TEN_STEP
        },
        structures::{leaderboard_entry::StandardEntry, score_record::ScoreRecord, value_type::ValueType},
        version_resolver::resolve_current
    },
    utils::{number_utils::round_to, progress_utils::progress_bar}
};

/// Points awarded for a 1-indexed placement. Only the top 25 score.
///
/// Ranks 1-3 step by 250 from 2500, ranks 4-10 by 125 from 2125 and
/// ranks 11-25 by 50 from 1450 (all offsets measured from rank 1).
pub fn position_points(rank: usize) -> Option<i64> {
    if rank == 0 || rank > STANDARD_TOP_N {
        return None;
    }

    let idx = (rank - 1) as i64;
    let points = if rank <= PODIUM_LAST_RANK {
        PODIUM_BASE - idx * PODIUM_STEP
    } else if rank <= TOP_TEN_LAST_RANK {
        TOP_TEN_BASE - idx * TOP_TEN_STEP
    } else {
        TAIL_BASE - idx * TAIL_STEP
    };

    Some(points)
}

#[derive(Debug)]
struct StandardTally {
    country: String,
    score: i64,
    wrs: u32,
    places: Vec<usize>
}

/// Ranks standard scores for the currently selected levels.
pub struct StandardRanker {
    selected_levels: HashSet<String>
}

impl StandardRanker {
    pub fn new<I, S>(selected_levels: I) -> StandardRanker
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        StandardRanker {
            selected_levels: selected_levels.into_iter().map(Into::into).collect()
        }
    }

    pub fn is_selected(&self, level_id: &str) -> bool {
        self.selected_levels.contains(level_id)
    }

    /// # Standard ranking
    ///
    /// 1. Keep standard records of the selected levels and drop stale level versions.
    /// 2. Per level, sort by value (descending) then submission date (ascending) and keep the top 25.
    /// 3. Award position points and fold them into per-entrant totals.
    ///
    /// The result is ordered by total score, descending. Equal totals keep first-seen order.
    pub fn rank(&self, records: &[ScoreRecord]) -> Vec<StandardEntry> {
        let eligible: Vec<ScoreRecord> = records
            .iter()
            .filter(|r| r.value_type == ValueType::Standard && self.is_selected(&r.level_id))
            .cloned()
            .collect();
        let current = resolve_current(eligible);

        let mut levels: IndexMap<&str, Vec<&ScoreRecord>> = IndexMap::new();
        for record in &current {
            levels.entry(record.level_id.as_str()).or_default().push(record);
        }

        let bar = progress_bar(levels.len() as u64, "Ranking standard levels".to_string());
        let mut tallies: IndexMap<String, StandardTally> = IndexMap::new();

        for (level_id, mut scores) in levels {
            // Stable sort, so identical (value, date) pairs keep feed order
            scores.sort_by(|a, b| b.value.cmp(&a.value).then(a.submitted_at.cmp(&b.submitted_at)));
            scores.truncate(STANDARD_TOP_N);

            debug!(level = level_id, ranked = scores.len(), "Ranked standard level");

            for (idx, record) in scores.into_iter().enumerate() {
                let rank = idx + 1;
                let Some(points) = position_points(rank) else {
                    continue;
                };

                let tally = tallies.entry(record.entrant()).or_insert_with(|| StandardTally {
                    country: record.country.clone(),
                    score: 0,
                    wrs: 0,
                    places: Vec::new()
                });

                tally.score += points;
                tally.places.push(rank);
                if rank == 1 {
                    tally.wrs += 1;
                }
            }

            bar.inc(1);
        }
        bar.finish_and_clear();

        let mut leaderboard: Vec<StandardEntry> = tallies
            .into_iter()
            .map(|(player_uuid, tally)| {
                let average = tally.places.iter().sum::<usize>() as f64 / tally.places.len() as f64;

                StandardEntry {
                    player_uuid,
                    country: tally.country,
                    score: tally.score,
                    wrs: tally.wrs,
                    average_place: round_to(average, AVERAGE_PLACE_DECIMALS)
                }
            })
            .collect();

        leaderboard.sort_by(|a, b| b.score.cmp(&a.score));

        info!(players = leaderboard.len(), "Standard leaderboard ranked");
        leaderboard
    }
}
