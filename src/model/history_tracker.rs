use std::{fs, io, path::Path};

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    archive::{ArchiveError, Snapshot},
    ingest::payloads::parse_player_rows,
    model::structures::{
        history_source::HistorySource,
        player_changes::{push_if_changed, PlayerChangeLog, PlayerChanges}
    },
    utils::{fs_utils::atomic_write, progress_utils::progress_bar}
};

/// What happened to a single snapshot during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// At or below the watermark, already folded in
    AlreadyProcessed,
    /// Payload was not a list of player rows
    Unreadable,
    /// Folded in, producing this many change events
    Applied(usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub applied: usize,
    pub already_processed: usize,
    pub unreadable: usize,
    pub events: usize
}

/// Folds leaderboard snapshots into per-player change logs.
///
/// Each source keeps its own watermark: the newest snapshot timestamp already
/// applied. Only strictly newer snapshots mutate the log, so replaying the same
/// archives again is a no-op.
pub struct HistoryTracker {
    log: PlayerChangeLog
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTracker {
    pub fn new() -> HistoryTracker {
        HistoryTracker {
            log: PlayerChangeLog::default()
        }
    }

    pub fn from_log(log: PlayerChangeLog) -> HistoryTracker {
        HistoryTracker { log }
    }

    /// Loads the change log at `path`. A missing file starts an empty log;
    /// a file that fails to parse is an error and is never overwritten.
    pub fn load(path: &Path) -> Result<HistoryTracker, ArchiveError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryTracker::new()),
            Err(source) => {
                return Err(ArchiveError::Io {
                    path: path.to_path_buf(),
                    source
                })
            }
        };

        let log = serde_json::from_str(&contents).map_err(|source| ArchiveError::Corrupt {
            path: path.to_path_buf(),
            source
        })?;

        Ok(HistoryTracker::from_log(log))
    }

    pub fn save(&mut self, path: &Path, now: &DateTime<Local>) -> Result<(), ArchiveError> {
        self.log.metadata.last_updated = Some(now.to_rfc3339());

        let bytes = serde_json::to_vec_pretty(&self.log)?;
        atomic_write(path, &bytes).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source
        })
    }

    pub fn watermark(&self, source: HistorySource) -> f64 {
        self.log.metadata.watermark(source)
    }

    pub fn get_changes(&self, player_id: &str) -> Option<&PlayerChanges> {
        self.log.players.get(player_id)
    }

    pub fn log(&self) -> &PlayerChangeLog {
        &self.log
    }

    pub fn into_log(self) -> PlayerChangeLog {
        self.log
    }

    /// Applies one snapshot of `source` if it is newer than the watermark.
    pub fn apply_snapshot(&mut self, source: HistorySource, snapshot: &Snapshot<Value>) -> SnapshotOutcome {
        let timestamp = snapshot.timestamp;
        if timestamp <= self.watermark(source) {
            return SnapshotOutcome::AlreadyProcessed;
        }

        // The snapshot is consumed either way; an unreadable payload never becomes readable
        self.log.metadata.set_watermark(source, timestamp);

        let Some(validated) = parse_player_rows(&snapshot.data) else {
            warn!(source = %source, timestamp, "Snapshot payload is not a list of players, skipping");
            return SnapshotOutcome::Unreadable;
        };

        let mut events = 0;
        for row in validated.rows {
            let changes = self.log.players.entry(row.acc).or_default();

            // Name and value are compared independently of each other
            if push_if_changed(&mut changes.usernames, timestamp, row.name) {
                events += 1;
            }

            let changed = match source {
                HistorySource::Xp => push_if_changed(&mut changes.xp_changes, timestamp, row.xp.unwrap_or(0)),
                HistorySource::Blitz => push_if_changed(&mut changes.blitz_changes, timestamp, row.bsr.unwrap_or(0.0))
            };
            if changed {
                events += 1;
            }
        }

        debug!(source = %source, timestamp, events, "Applied snapshot");
        SnapshotOutcome::Applied(events)
    }

    /// Replays `snapshots` of `source` in ascending timestamp order.
    pub fn replay(&mut self, source: HistorySource, snapshots: &[Snapshot<Value>]) -> ReplaySummary {
        let mut ordered: Vec<&Snapshot<Value>> = snapshots.iter().collect();
        ordered.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let bar = progress_bar(ordered.len() as u64, format!("Replaying {} snapshots", source));
        let mut summary = ReplaySummary::default();

        for snapshot in ordered {
            match self.apply_snapshot(source, snapshot) {
                SnapshotOutcome::AlreadyProcessed => summary.already_processed += 1,
                SnapshotOutcome::Unreadable => summary.unreadable += 1,
                SnapshotOutcome::Applied(events) => {
                    summary.applied += 1;
                    summary.events += events;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!(
            source = %source,
            applied = summary.applied,
            already_processed = summary.already_processed,
            events = summary.events,
            watermark = self.watermark(source),
            "Replayed archive"
        );
        summary
    }
}
