use crate::{
    archive::Snapshot,
    model::structures::{score_record::ScoreRecord, value_type::ValueType}
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

pub fn generate_score_record(
    level_id: &str,
    level_version: u32,
    player_id: &str,
    value: i64,
    submitted_at: i64
) -> ScoreRecord {
    ScoreRecord {
        level_id: level_id.to_string(),
        level_version,
        player_ids: vec![player_id.to_string()],
        value,
        value_type: ValueType::Standard,
        submitted_at,
        country: "US".to_string()
    }
}

pub fn generate_coop_record(
    level_id: &str,
    level_version: u32,
    player_one: &str,
    player_two: &str,
    value: i64,
    submitted_at: i64
) -> ScoreRecord {
    let mut record = generate_score_record(level_id, level_version, player_one, value, submitted_at);
    record.player_ids.push(player_two.to_string());
    record
}

pub fn generate_speedrun(level_id: &str, level_version: u32, player_id: &str, value: i64, submitted_at: i64) -> ScoreRecord {
    let mut record = generate_score_record(level_id, level_version, player_id, value, submitted_at);
    record.value_type = ValueType::Speedrun;
    record
}

pub fn generate_coop_speedrun(
    level_id: &str,
    level_version: u32,
    player_one: &str,
    player_two: &str,
    value: i64,
    submitted_at: i64
) -> ScoreRecord {
    let mut record = generate_coop_record(level_id, level_version, player_one, player_two, value, submitted_at);
    record.value_type = ValueType::Speedrun;
    record
}

/// `n` standard scores on one level from players `p1..=pn`, `p1` holding the best score.
pub fn generate_level_scores(level_id: &str, level_version: u32, n: usize) -> Vec<ScoreRecord> {
    (1..=n)
        .map(|i| generate_score_record(level_id, level_version, &format!("p{}", i), (1000 - i) as i64, 1))
        .collect()
}

pub fn generate_catalog(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("level-{}", i)).collect()
}

pub fn generate_xp_row(acc: &str, name: &str, xp: i64) -> Value {
    json!({ "acc": acc, "name": name, "xp": xp })
}

pub fn generate_blitz_row(acc: &str, name: &str, bsr: f64) -> Value {
    json!({ "acc": acc, "name": name, "bsr": bsr })
}

pub fn generate_snapshot(timestamp: f64, rows: Vec<Value>) -> Snapshot<Value> {
    Snapshot {
        timestamp,
        data: Value::Array(rows)
    }
}

/// Reproducible RNG for level draws
pub fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
