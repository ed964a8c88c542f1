use std::process::ExitCode;

use clap::Parser;
use pww_processor::{
    archive::{ArchiveCategory, ArchiveError, ArchiveStore, Snapshot},
    args::{Args, Command},
    config::Config,
    jobs::{JobContext, JobRegistry}
};
use serde_json::Value;
use tracing::error;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = Config::new(args.storage_root.clone());
    let registry = JobRegistry::new();

    match args.command {
        Command::List => {
            for job in registry.jobs() {
                println!("{:<20} {:<12} {}", job.name, job.schedule, job.description);
            }
            ExitCode::SUCCESS
        }
        Command::Run { job } => {
            let mut ctx = JobContext::new(config);
            match registry.run(&job, &mut ctx) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(job = %job, error = %e, "Job failed");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Show {
            category,
            month,
            year,
            at
        } => {
            let store = ArchiveStore::new(config.storage_root);
            match render_snapshot(&store, category, month, year, at) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(category = %category, month, year, error = %e, "Failed to read snapshot");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// The latest snapshot of the month, or the one closest to `at`, as pretty JSON
fn render_snapshot(
    store: &ArchiveStore,
    category: ArchiveCategory,
    month: u32,
    year: i32,
    at: Option<f64>
) -> Result<String, ArchiveError> {
    let snapshot: Snapshot<Value> = match at {
        Some(target) => store.read_closest(category, month, year, target)?,
        None => store.read_latest(category, month, year)?
    };

    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn init_tracing(level: &str) {
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}
