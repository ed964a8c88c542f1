use std::collections::HashSet;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use tracing::{debug, info};

use crate::{
    model::{
        constants::{ANONYMOUS_PLAYER_ID, SPEEDRUN_DECIMALS, SPEEDRUN_POINTS_SCALE, SPEEDRUN_POPULARITY_ROOT},
        structures::{
            leaderboard_entry::SpeedrunEntry, score_record::ScoreRecord, speedrun_bucket::SpeedrunBucket,
            value_type::ValueType
        },
        version_resolver::resolve_current
    },
    utils::{number_utils::round_to, progress_utils::progress_bar}
};

lazy_static! {
    /// Canonical levels shipped with the game. Everything else is community content.
    pub static ref OFFICIAL_LEVELS: HashSet<&'static str> = [
        "asteroids",
        "waves",
        "eskiv",
        "fury",
        "hexagon",
        "ceasefire",
        "partitioner",
        "symbiosis",
        "pandemonium",
        "oasis"
    ]
    .into_iter()
    .collect();
}

pub fn is_official(level_id: &str) -> bool {
    OFFICIAL_LEVELS.contains(level_id)
}

/// `P = (N^(1/6) * 100) / sqrt(R)`
///
/// `participants` is the number of distinct players on the level, `rank` is 1-indexed.
pub fn speedrun_points(participants: usize, rank: usize) -> f64 {
    (participants as f64).powf(1.0 / SPEEDRUN_POPULARITY_ROOT) * SPEEDRUN_POINTS_SCALE / (rank as f64).sqrt()
}

/// Distinct player ids across a level's records. Both co-op partners count.
fn count_participants(scores: &[&ScoreRecord]) -> usize {
    scores
        .iter()
        .flat_map(|r| r.player_ids.iter())
        .collect::<HashSet<_>>()
        .len()
}

impl SpeedrunEntry {
    fn new(player_uuid: String, country: String) -> SpeedrunEntry {
        SpeedrunEntry {
            player_uuid,
            country,
            ..Default::default()
        }
    }

    fn bucket_mut(&mut self, bucket: SpeedrunBucket) -> &mut f64 {
        match bucket {
            SpeedrunBucket::SoloOfficial => &mut self.score_1p_official,
            SpeedrunBucket::CoopOfficial => &mut self.score_2p_official,
            SpeedrunBucket::SoloCommunity => &mut self.score_1p_community,
            SpeedrunBucket::CoopCommunity => &mut self.score_2p_community
        }
    }

    pub fn bucket(&self, bucket: SpeedrunBucket) -> f64 {
        match bucket {
            SpeedrunBucket::SoloOfficial => self.score_1p_official,
            SpeedrunBucket::CoopOfficial => self.score_2p_official,
            SpeedrunBucket::SoloCommunity => self.score_1p_community,
            SpeedrunBucket::CoopCommunity => self.score_2p_community
        }
    }

    fn rounded(mut self) -> SpeedrunEntry {
        self.score_1p_official = round_to(self.score_1p_official, SPEEDRUN_DECIMALS);
        self.score_2p_official = round_to(self.score_2p_official, SPEEDRUN_DECIMALS);
        self.score_1p_community = round_to(self.score_1p_community, SPEEDRUN_DECIMALS);
        self.score_2p_community = round_to(self.score_2p_community, SPEEDRUN_DECIMALS);
        self
    }
}

/// # Speedrun ranking
///
/// Every level with speedrun records is ranked. Points decay with the square root of
/// the rank and grow with the sixth root of the level's player count. A player scores
/// at most once per level in each of solo and co-op; lower placements in the same mode
/// are skipped but still occupy their rank.
///
/// Totals are rounded to 2 decimals and ordered by the sum of all four buckets.
pub fn rank_speedruns(records: &[ScoreRecord]) -> Vec<SpeedrunEntry> {
    let eligible: Vec<ScoreRecord> = records
        .iter()
        .filter(|r| r.value_type == ValueType::Speedrun)
        .cloned()
        .collect();
    let current = resolve_current(eligible);

    let mut levels: IndexMap<&str, Vec<&ScoreRecord>> = IndexMap::new();
    for record in &current {
        levels.entry(record.level_id.as_str()).or_default().push(record);
    }

    let bar = progress_bar(levels.len() as u64, "Ranking speedrun levels".to_string());
    let mut players: IndexMap<String, SpeedrunEntry> = IndexMap::new();

    for (level_id, mut scores) in levels {
        let official = is_official(level_id);

        // Higher value is the faster time, older submissions win ties
        scores.sort_by(|a, b| b.value.cmp(&a.value).then(a.submitted_at.cmp(&b.submitted_at)));

        let participants = count_participants(&scores);
        if participants == 0 {
            bar.inc(1);
            continue;
        }

        let mut seen_solo: HashSet<&str> = HashSet::new();
        let mut seen_coop: HashSet<&str> = HashSet::new();

        for (idx, record) in scores.iter().enumerate() {
            let points = speedrun_points(participants, idx + 1);
            let coop = record.is_coop();
            let bucket = SpeedrunBucket::classify(official, coop);

            for player_id in &record.player_ids {
                if player_id == ANONYMOUS_PLAYER_ID {
                    continue;
                }

                let seen = if coop { &mut seen_coop } else { &mut seen_solo };
                if !seen.insert(player_id.as_str()) {
                    continue;
                }

                let entry = players
                    .entry(player_id.clone())
                    .or_insert_with(|| SpeedrunEntry::new(player_id.clone(), record.country.clone()));
                *entry.bucket_mut(bucket) += points;
            }
        }

        debug!(level = level_id, participants, official, "Ranked speedrun level");
        bar.inc(1);
    }
    bar.finish_and_clear();

    let mut leaderboard: Vec<SpeedrunEntry> = players.into_values().map(SpeedrunEntry::rounded).collect();
    leaderboard.sort_by(|a, b| b.total().total_cmp(&a.total()));

    info!(players = leaderboard.len(), "Speedrun leaderboard ranked");
    leaderboard
}
