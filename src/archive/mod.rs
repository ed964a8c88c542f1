mod archive_structs;
pub mod snapshot_file;
mod store;

pub use archive_structs::{ArchiveCategory, Snapshot};
pub use snapshot_file::ArchiveError;
pub use store::{epoch_seconds, ArchiveFile, ArchiveStore};
