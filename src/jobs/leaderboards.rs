use tracing::info;

use super::{encode_csv, JobContext, JobReport};
use crate::{
    archive::ArchiveCategory,
    error::ProcessorError,
    ingest::{
        score_feed::{CsvScoreSource, ScoreSource},
        SourceError
    },
    model::{speedrun::rank_speedruns, standard::StandardRanker},
    utils::fs_utils::{read_lines, WriteBatch}
};

const STANDARD_HEADERS: [&str; 5] = ["player_uuid", "country", "score", "wrs", "average_place"];
const SPEEDRUN_HEADERS: [&str; 6] = [
    "player_uuid",
    "country",
    "score_1p_official",
    "score_2p_official",
    "score_1p_community",
    "score_2p_community"
];

/// Ranks the levels of the current selection and publishes the monthly leaderboard.
pub fn monthly_lb_daily(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    let levels_path = ctx.config.levels_path();
    let selected = read_lines(&levels_path).map_err(|source| SourceError::Unavailable {
        path: levels_path.clone(),
        source
    })?;
    if selected.is_empty() {
        return Err(ProcessorError::insufficient(format!(
            "no current level selection in {}",
            levels_path.display()
        )));
    }

    let dataset = CsvScoreSource::new(ctx.config.score_data_path()).load()?;
    let entries = StandardRanker::new(selected).rank(&dataset.records);
    let csv = encode_csv(&STANDARD_HEADERS, &entries)?;

    // The existing archive is validated before anything is replaced
    let output = ctx.config.monthly_leaderboard_path();
    let mut batch = WriteBatch::new();
    batch.add(&output, csv);
    let archive = ctx
        .store
        .append_at_with(ArchiveCategory::MonthlyLeaderboard, &ctx.now, &entries, batch)?;

    info!(players = entries.len(), skipped_rows = dataset.skipped, "Published monthly leaderboard");
    Ok(JobReport::new(entries.len()).wrote(output).wrote(archive))
}

/// Ranks every speedrun submission and publishes the speedrun leaderboard.
pub fn speedrun_lb_daily(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    let dataset = CsvScoreSource::new(ctx.config.score_data_path()).load()?;
    let entries = rank_speedruns(&dataset.records);
    let csv = encode_csv(&SPEEDRUN_HEADERS, &entries)?;

    let output = ctx.config.speedrun_leaderboard_path();
    let mut batch = WriteBatch::new();
    batch.add(&output, csv);
    let archive = ctx
        .store
        .append_at_with(ArchiveCategory::SpeedrunLeaderboard, &ctx.now, &entries, batch)?;

    info!(players = entries.len(), skipped_rows = dataset.skipped, "Published speedrun leaderboard");
    Ok(JobReport::new(entries.len()).wrote(output).wrote(archive))
}
