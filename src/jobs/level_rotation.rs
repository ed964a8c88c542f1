use std::path::Path;

use tracing::info;

use super::{JobContext, JobReport};
use crate::{
    archive::ArchiveCategory,
    config::SelectionConfig,
    error::ProcessorError,
    ingest::{score_feed::load_level_catalog, SourceError},
    model::level_selector::{select_levels, LevelSelectionState},
    utils::fs_utils::{lines_to_bytes, read_lines, WriteBatch}
};

fn read_level_list(path: &Path) -> Result<Vec<String>, SourceError> {
    read_lines(path).map_err(|source| SourceError::Unavailable {
        path: path.to_path_buf(),
        source
    })
}

/// Retires the current selection and draws the next one.
///
/// Nothing is written unless the draw succeeds.
pub fn monthly_lb_monthly(ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
    let catalog = load_level_catalog(&ctx.config.level_data_path())?;
    let exclusions = SelectionConfig::load(&ctx.config.selection_config_path())?.exclusions();

    let levels_path = ctx.config.levels_path();
    let banned_path = ctx.config.banned_levels_path();
    let state = LevelSelectionState {
        current: read_level_list(&levels_path)?,
        banned: read_level_list(&banned_path)?
    };

    let next = select_levels(&catalog, &exclusions, &state, &mut ctx.rng)?;

    let mut batch = WriteBatch::new();
    batch.add(&banned_path, lines_to_bytes(&next.banned));
    batch.add(&levels_path, lines_to_bytes(&next.current));
    let archive = ctx
        .store
        .append_at_with(ArchiveCategory::LevelSelection, &ctx.now, &next, batch)?;

    info!(
        catalog = catalog.len(),
        excluded = exclusions.len(),
        banned = next.banned.len(),
        "Rotated monthly levels"
    );
    Ok(JobReport::new(next.current.len())
        .wrote(levels_path)
        .wrote(banned_path)
        .wrote(archive))
}
