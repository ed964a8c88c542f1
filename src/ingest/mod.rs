use std::{io, path::PathBuf};

use thiserror::Error;

pub mod payloads;
pub mod score_feed;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    #[error("Source {} is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String }
}

impl SourceError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> SourceError {
        SourceError::Malformed {
            path: path.into(),
            reason: reason.to_string()
        }
    }
}
