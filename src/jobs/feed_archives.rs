use serde_json::Value;
use tracing::info;

use super::{JobContext, JobReport};
use crate::{
    archive::ArchiveCategory,
    error::ProcessorError,
    ingest::{
        payloads::{load_payload, parse_player_rows, parse_quests},
        SourceError
    }
};

/// Returns the number of valid rows, or `None` when the payload has the wrong shape.
type Validator = fn(&Value) -> Option<usize>;

fn player_rows(payload: &Value) -> Option<usize> {
    parse_player_rows(payload).map(|v| v.rows.len())
}

fn quests(payload: &Value) -> Option<usize> {
    parse_quests(payload).map(|v| v.rows.len())
}

/// Validates the payload the fetcher dropped for `feed` and appends it verbatim.
fn archive_feed(
    ctx: &JobContext,
    feed: &str,
    category: ArchiveCategory,
    validate: Validator
) -> Result<JobReport, ProcessorError> {
    let input = ctx.config.incoming_path(feed);
    let payload = load_payload(&input)?;

    let rows = validate(&payload)
        .ok_or_else(|| SourceError::malformed(&input, format!("unexpected {} payload shape", feed)))?;

    let archive = ctx.store.append_at(category, &ctx.now, &payload)?;

    info!(feed, rows, "Archived feed payload");
    Ok(JobReport::new(rows).wrote(archive))
}

pub fn xp_lb_archive(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    archive_feed(ctx, "xp_lb", ArchiveCategory::XpLeaderboard, player_rows)
}

pub fn blitz_lb_archive(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    archive_feed(ctx, "blitz_lb", ArchiveCategory::BlitzLeaderboard, player_rows)
}

pub fn quests_archive(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    archive_feed(ctx, "quests", ArchiveCategory::Quests, quests)
}
