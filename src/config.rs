use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};

use crate::ingest::SourceError;

pub const DEFAULT_STORAGE_ROOT: &str = "/storage";

/// Where every job reads its inputs from and writes its outputs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the shared storage volume
    pub storage_root: PathBuf
}

impl Config {
    pub fn new(storage_root: impl Into<PathBuf>) -> Config {
        Config {
            storage_root: storage_root.into()
        }
    }

    /// Creates a configuration from the `STORAGE_ROOT` environment variable
    pub fn from_env() -> Config {
        Config::new(env::var("STORAGE_ROOT").unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string()))
    }

    fn join(&self, parts: &[&str]) -> PathBuf {
        parts.iter().fold(self.storage_root.clone(), |path, part| path.join(part))
    }

    pub fn score_data_path(&self) -> PathBuf {
        self.join(&["github_data", "score_data.csv"])
    }

    pub fn level_data_path(&self) -> PathBuf {
        self.join(&["github_data", "level_data.csv"])
    }

    /// The current level selection, one id per line
    pub fn levels_path(&self) -> PathBuf {
        self.join(&["monthly_leaderboard_monthly", "levels.txt"])
    }

    pub fn banned_levels_path(&self) -> PathBuf {
        self.join(&["monthly_leaderboard_monthly", "banned_levels.txt"])
    }

    pub fn selection_config_path(&self) -> PathBuf {
        self.join(&["monthly_leaderboard_monthly", "config.json"])
    }

    pub fn monthly_leaderboard_path(&self) -> PathBuf {
        self.join(&["monthly_leaderboard_daily", "leaderboard.csv"])
    }

    pub fn speedrun_leaderboard_path(&self) -> PathBuf {
        self.join(&["speedrun_lb_daily", "leaderboard.csv"])
    }

    pub fn player_changes_path(&self) -> PathBuf {
        self.join(&["player_data", "player_changes.json"])
    }

    /// Upstream payloads are dropped here by the fetcher, e.g. `incoming/xp_lb.json`
    pub fn incoming_path(&self, feed: &str) -> PathBuf {
        self.join(&["incoming", &format!("{}.json", feed)])
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_STORAGE_ROOT)
    }
}

/// Operator-maintained settings for the monthly level draw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Levels that are never drawn
    #[serde(default)]
    pub exclude: Vec<String>
}

impl SelectionConfig {
    /// Reads `config.json`. A missing file means no exclusions.
    pub fn load(path: &Path) -> Result<SelectionConfig, SourceError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SelectionConfig::default()),
            Err(source) => {
                return Err(SourceError::Unavailable {
                    path: path.to_path_buf(),
                    source
                })
            }
        };

        serde_json::from_str(&contents).map_err(|e| SourceError::malformed(path, e))
    }

    pub fn exclusions(&self) -> HashSet<String> {
        self.exclude.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::{Config, SelectionConfig};

    #[test]
    fn test_paths_derive_from_storage_root() {
        let config = Config::new("/data");

        assert_eq!(config.score_data_path(), PathBuf::from("/data/github_data/score_data.csv"));
        assert_eq!(
            config.levels_path(),
            PathBuf::from("/data/monthly_leaderboard_monthly/levels.txt")
        );
        assert_eq!(config.incoming_path("xp_lb"), PathBuf::from("/data/incoming/xp_lb.json"));
        assert_eq!(
            config.player_changes_path(),
            PathBuf::from("/data/player_data/player_changes.json")
        );
    }

    #[test]
    fn test_default_storage_root() {
        assert_eq!(Config::default().storage_root, PathBuf::from("/storage"));
    }

    #[test]
    fn test_missing_selection_config_has_no_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let config = SelectionConfig::load(&dir.path().join("config.json")).unwrap();

        assert!(config.exclusions().is_empty());
    }

    #[test]
    fn test_selection_config_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"exclude": ["hexagon", "waves"]}"#).unwrap();

        let exclusions = SelectionConfig::load(&path).unwrap().exclusions();

        assert_eq!(exclusions.len(), 2);
        assert!(exclusions.contains("hexagon"));
    }

    #[test]
    fn test_malformed_selection_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(SelectionConfig::load(&path).is_err());
    }
}
