use thiserror::Error;

use crate::{archive::ArchiveError, ingest::SourceError, model::level_selector::SelectionError};

/// Everything a job can fail with. A failed job has written nothing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown job '{0}'")]
    UnknownJob(String)
}

impl ProcessorError {
    pub fn insufficient(reason: impl ToString) -> ProcessorError {
        ProcessorError::InsufficientData {
            reason: reason.to_string()
        }
    }
}
