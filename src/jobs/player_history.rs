use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::info;

use super::{JobContext, JobReport};
use crate::{
    archive::Snapshot,
    error::ProcessorError,
    model::{history_tracker::HistoryTracker, structures::history_source::HistorySource},
    utils::progress_utils::progress_spinner
};

/// Folds every XP and Blitz snapshot newer than its watermark into the player change log.
pub fn player_data(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    let path = ctx.config.player_changes_path();
    let mut tracker = HistoryTracker::load(&path)?;

    // Read every source before touching the log so a corrupt archive aborts the run
    let spinner = progress_spinner("Reading leaderboard archives".to_string());
    let mut archives = Vec::new();
    for source in HistorySource::iter() {
        let snapshots: Vec<Snapshot<Value>> = ctx.store.read_category(source.archive_category())?;
        spinner.tick();
        archives.push((source, snapshots));
    }
    spinner.finish_and_clear();

    let mut applied = 0;
    for (source, snapshots) in &archives {
        let summary = tracker.replay(*source, snapshots);
        applied += summary.applied + summary.unreadable;
    }

    tracker.save(&path, &ctx.now)?;

    info!(players = tracker.log().players.len(), snapshots = applied, "Updated player change log");
    Ok(JobReport::new(applied).wrote(path))
}
