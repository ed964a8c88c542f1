use std::{fs, path::Path, sync::Once};

use chrono::{DateTime, Local, TimeZone};
use pww_processor::{config::Config, jobs::JobContext, utils::test_utils::seeded_rng};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub const SCORE_HEADER: &str = "level_uuid,level_version,account_ids,value,value_type,date,country";

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A fresh storage root. The directory lives as long as the returned guard.
pub fn storage() -> (TempDir, Config) {
    init_test_env();

    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path());
    (dir, config)
}

/// Noon local time on the given day
pub fn local_time(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(year, month, day, 12, 0, 0).single().unwrap()
}

pub fn context_at(config: &Config, now: DateTime<Local>) -> JobContext {
    JobContext::with_clock(config.clone(), now, seeded_rng())
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Writes the score feed from `rows` in [`SCORE_HEADER`] column order
pub fn write_scores(config: &Config, rows: &[&str]) {
    let mut contents = format!("{}\n", SCORE_HEADER);
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    write_file(&config.score_data_path(), &contents);
}

pub fn write_catalog(config: &Config, levels: &[String]) {
    let mut contents = "level_uuid\n".to_string();
    for level in levels {
        contents.push_str(level);
        contents.push('\n');
    }
    write_file(&config.level_data_path(), &contents);
}

pub fn write_levels(config: &Config, levels: &[&str]) {
    write_file(&config.levels_path(), &format!("{}\n", levels.join("\n")));
}
