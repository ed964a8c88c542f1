use std::{path::PathBuf, time::Instant};

use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::{archive::ArchiveStore, config::Config, error::ProcessorError};

mod feed_archives;
mod leaderboards;
mod level_rotation;
mod player_history;

pub use feed_archives::{blitz_lb_archive, quests_archive, xp_lb_archive};
pub use leaderboards::{monthly_lb_daily, speedrun_lb_daily};
pub use level_rotation::monthly_lb_monthly;
pub use player_history::player_data;

/// Everything a job may touch. Built once per run and handed to the job.
pub struct JobContext {
    pub config: Config,
    pub store: ArchiveStore,
    /// Wall-clock time of the run; snapshots are stamped and addressed by it
    pub now: DateTime<Local>,
    pub rng: ChaCha8Rng
}

impl JobContext {
    pub fn new(config: Config) -> JobContext {
        let rng = ChaCha8Rng::from_rng(&mut rand::rng());
        JobContext::with_clock(config, Local::now(), rng)
    }

    /// A context with a fixed clock and RNG
    pub fn with_clock(config: Config, now: DateTime<Local>, rng: ChaCha8Rng) -> JobContext {
        let store = ArchiveStore::new(config.storage_root.clone());
        JobContext { config, store, now, rng }
    }
}

/// What a successful run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReport {
    /// Entries ranked, snapshots replayed or rows archived, depending on the job
    pub processed: usize,
    pub written: Vec<PathBuf>
}

impl JobReport {
    pub fn new(processed: usize) -> JobReport {
        JobReport {
            processed,
            written: Vec::new()
        }
    }

    pub fn wrote(mut self, path: impl Into<PathBuf>) -> JobReport {
        self.written.push(path.into());
        self
    }
}

pub type JobFn = fn(&mut JobContext) -> Result<JobReport, ProcessorError>;

#[derive(Clone, Copy)]
pub struct Job {
    pub name: &'static str,
    /// Cron expression the external scheduler uses. Informational only.
    pub schedule: &'static str,
    pub description: &'static str,
    pub run: JobFn
}

pub struct JobRegistry {
    jobs: Vec<Job>
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> JobRegistry {
        JobRegistry {
            jobs: vec![
                Job {
                    name: "monthly_lb_daily",
                    schedule: "0 0 * * *",
                    description: "Ranks the selected levels into the monthly leaderboard",
                    run: monthly_lb_daily
                },
                Job {
                    name: "speedrun_lb_daily",
                    schedule: "0 0 * * *",
                    description: "Ranks every speedrun into the speedrun leaderboard",
                    run: speedrun_lb_daily
                },
                Job {
                    name: "monthly_lb_monthly",
                    schedule: "0 0 1 * *",
                    description: "Draws the next five levels for the monthly leaderboard",
                    run: monthly_lb_monthly
                },
                Job {
                    name: "player_data",
                    schedule: "30 0 * * *",
                    description: "Replays XP and Blitz archives into the player change log",
                    run: player_data
                },
                Job {
                    name: "xp_lb_archive",
                    schedule: "0 0 * * *",
                    description: "Archives the XP leaderboard payload",
                    run: xp_lb_archive
                },
                Job {
                    name: "blitz_lb_archive",
                    schedule: "0 0 * * *",
                    description: "Archives the Blitz leaderboard payload",
                    run: blitz_lb_archive
                },
                Job {
                    name: "quests_archive",
                    schedule: "5 0 * * *",
                    description: "Archives the daily quests payload",
                    run: quests_archive
                }
            ]
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }

    pub fn run(&self, name: &str, ctx: &mut JobContext) -> Result<JobReport, ProcessorError> {
        let job = self
            .get(name)
            .ok_or_else(|| ProcessorError::UnknownJob(name.to_string()))?;

        info!(job = job.name, "Job started");
        let start = Instant::now();

        let report = (job.run)(ctx)?;

        info!(
            job = job.name,
            processed = report.processed,
            written = report.written.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Job completed"
        );
        Ok(report)
    }
}

/// Encodes `rows` as CSV under `headers`. The header line is written even when there are no rows.
pub(crate) fn encode_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, ProcessorError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ProcessorError::Csv(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use super::{encode_csv, JobRegistry};
    use crate::model::structures::leaderboard_entry::StandardEntry;

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = JobRegistry::new().jobs().iter().map(|job| job.name).collect();

        assert_eq!(
            names,
            vec![
                "monthly_lb_daily",
                "speedrun_lb_daily",
                "monthly_lb_monthly",
                "player_data",
                "xp_lb_archive",
                "blitz_lb_archive",
                "quests_archive"
            ]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = JobRegistry::new();

        assert!(registry.get("player_data").is_some());
        assert!(registry.get("github_data").is_none());
    }

    #[test]
    fn test_encode_csv_writes_header_without_rows() {
        let rows: Vec<StandardEntry> = Vec::new();
        let bytes = encode_csv(&["player_uuid", "country"], &rows).unwrap();

        assert_eq!(String::from_utf8(bytes).unwrap(), "player_uuid,country\n");
    }

    #[test]
    fn test_encode_csv_rows() {
        let rows = vec![StandardEntry {
            player_uuid: "a|b".to_string(),
            country: "FR".to_string(),
            score: 2500,
            wrs: 1,
            average_place: 1.0
        }];
        let bytes = encode_csv(&["player_uuid", "country", "score", "wrs", "average_place"], &rows).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "player_uuid,country,score,wrs,average_place\na|b,FR,2500,1,1.0\n"
        );
    }
}
