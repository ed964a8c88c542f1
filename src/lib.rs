pub mod archive;
pub mod args;
pub mod config;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod model;
pub mod utils;
