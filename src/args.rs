use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::archive::ArchiveCategory;

#[derive(Parser, Clone)]
#[command(
    display_name = "PWW Processor",
    long_about = "Builds leaderboards, archives snapshots and reconstructs player history"
)]
pub struct Args {
    /// Root of the storage volume every job reads from and writes to
    #[arg(
        short,
        long,
        env = "STORAGE_ROOT",
        default_value = "/storage",
        help = "Storage root directory"
    )]
    pub storage_root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Runs a single job by name
    Run {
        /// Job name, see `list`
        job: String
    },

    /// Lists every registered job with its schedule
    List,

    /// Prints an archived snapshot as JSON
    Show {
        /// Archive category, e.g. monthly_leaderboard or xp_leaderboard
        category: ArchiveCategory,
        month: u32,
        year: i32,
        /// Epoch seconds; the closest snapshot is shown instead of the latest
        #[arg(long)]
        at: Option<f64>
    }
}
