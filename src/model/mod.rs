pub mod constants;
pub mod history_tracker;
pub mod level_selector;
pub mod speedrun;
pub mod standard;
pub mod structures;
pub mod version_resolver;
