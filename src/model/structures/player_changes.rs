use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::history_source::HistorySource;

/// A single entry of a run-length compressed value history.
pub trait ChangeEvent {
    type Value: PartialEq + Clone;

    fn new(timestamp: f64, value: Self::Value) -> Self;
    fn value(&self) -> &Self::Value;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsernameChange {
    pub timestamp: f64,
    pub name: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpChange {
    pub timestamp: f64,
    pub xp: i64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlitzChange {
    pub timestamp: f64,
    pub bsr: f64
}

impl ChangeEvent for UsernameChange {
    type Value = String;

    fn new(timestamp: f64, value: String) -> Self {
        UsernameChange { timestamp, name: value }
    }

    fn value(&self) -> &String {
        &self.name
    }
}

impl ChangeEvent for XpChange {
    type Value = i64;

    fn new(timestamp: f64, value: i64) -> Self {
        XpChange { timestamp, xp: value }
    }

    fn value(&self) -> &i64 {
        &self.xp
    }
}

impl ChangeEvent for BlitzChange {
    type Value = f64;

    fn new(timestamp: f64, value: f64) -> Self {
        BlitzChange { timestamp, bsr: value }
    }

    fn value(&self) -> &f64 {
        &self.bsr
    }
}

/// Appends a change event unless `value` equals the most recent recorded value.
/// Returns whether an event was appended.
pub fn push_if_changed<E: ChangeEvent>(events: &mut Vec<E>, timestamp: f64, value: E::Value) -> bool {
    if let Some(last) = events.last() {
        if *last.value() == value {
            return false;
        }
    }

    events.push(E::new(timestamp, value));
    true
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerChanges {
    #[serde(default)]
    pub usernames: Vec<UsernameChange>,
    #[serde(default)]
    pub xp_changes: Vec<XpChange>,
    #[serde(default)]
    pub blitz_changes: Vec<BlitzChange>
}

/// Watermarks: the newest snapshot timestamp already folded into the log, per source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeLogMetadata {
    #[serde(default)]
    pub last_xp_processed: f64,
    #[serde(default)]
    pub last_blitz_processed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>
}

impl ChangeLogMetadata {
    pub fn watermark(&self, source: HistorySource) -> f64 {
        match source {
            HistorySource::Xp => self.last_xp_processed,
            HistorySource::Blitz => self.last_blitz_processed
        }
    }

    pub fn set_watermark(&mut self, source: HistorySource, timestamp: f64) {
        match source {
            HistorySource::Xp => self.last_xp_processed = timestamp,
            HistorySource::Blitz => self.last_blitz_processed = timestamp
        }
    }
}

/// The on-disk change log: one object keyed by player id, plus `_metadata`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerChangeLog {
    #[serde(rename = "_metadata", default)]
    pub metadata: ChangeLogMetadata,
    #[serde(flatten)]
    pub players: IndexMap<String, PlayerChanges>
}
