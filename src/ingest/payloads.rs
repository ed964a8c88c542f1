use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::SourceError;

/// One player row of an upstream XP or Blitz leaderboard payload.
///
/// Only `acc` is required. Null or mistyped optional fields fall back to their defaults
/// instead of dropping the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub acc: String,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_xp")]
    pub xp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bsr")]
    pub bsr: Option<f64>
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(name) => name,
        other => other.to_string()
    })
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None
    }
    .filter(|f| f.is_finite())
}

fn lenient_xp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let exact = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None
    };

    Ok(exact.or_else(|| parse_float(&value).map(|f| f as i64)))
}

fn lenient_bsr<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(parse_float(&Value::deserialize(deserializer)?))
}

/// A daily quest. Only some quest kinds target an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy: Option<Value>,
    #[serde(flatten)]
    pub details: Map<String, Value>
}

/// Rows that passed validation, and how many did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub rows: Vec<T>,
    pub skipped: usize
}

/// Reads a JSON payload dropped by the upstream fetcher.
pub fn load_payload(path: &Path) -> Result<Value, SourceError> {
    let contents = fs::read_to_string(path).map_err(|source| SourceError::Unavailable {
        path: path.to_path_buf(),
        source
    })?;

    serde_json::from_str(&contents).map_err(|e| SourceError::malformed(path, e))
}

fn validate_array<T: DeserializeOwned>(items: &[Value], what: &str) -> Validated<T> {
    let mut rows = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (idx, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(row) => rows.push(row),
            Err(e) => {
                debug!(index = idx, error = %e, "Skipping malformed {} row", what);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped malformed {} rows", what);
    }

    Validated { rows, skipped }
}

/// Validates a leaderboard payload. The payload must be an array; rows without an
/// account id are skipped.
pub fn parse_player_rows(payload: &Value) -> Option<Validated<PlayerRow>> {
    let items = payload.as_array()?;
    let mut validated: Validated<PlayerRow> = validate_array(items, "player");

    let before = validated.rows.len();
    validated.rows.retain(|row| !row.acc.is_empty());
    validated.skipped += before - validated.rows.len();

    Some(validated)
}

/// Validates a quests payload: either a bare array of quests or an object with a `quests` array.
pub fn parse_quests(payload: &Value) -> Option<Validated<QuestRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(map) => map.get("quests")?.as_array()?,
        _ => return None
    };

    Some(validate_array(items, "quest"))
}
