pub mod history_source;
pub mod leaderboard_entry;
pub mod player_changes;
pub mod score_record;
pub mod speedrun_bucket;
pub mod value_type;
