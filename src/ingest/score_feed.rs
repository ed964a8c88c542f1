use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::SourceError;
use crate::model::structures::{score_record::ScoreRecord, value_type::ValueType};

/// A row exactly as it appears in the score feed, before validation.
#[derive(Debug, Deserialize)]
struct ScoreRow {
    level_uuid: String,
    #[serde(default)]
    level_version: Option<u32>,
    account_ids: String,
    value: i64,
    #[serde(default)]
    value_type: Option<i32>,
    // Older dumps name the column `type`
    #[serde(default, rename = "type")]
    kind: Option<i32>,
    date: i64,
    #[serde(default)]
    country: Option<String>
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = String;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        if row.level_uuid.trim().is_empty() {
            return Err("empty level_uuid".to_string());
        }

        let player_ids: Vec<String> = row
            .account_ids
            .split('|')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if player_ids.is_empty() || player_ids.len() > 2 {
            return Err(format!("expected 1 or 2 account ids, found {:?}", row.account_ids));
        }

        let value_type = match row.value_type.or(row.kind) {
            Some(v) => ValueType::try_from(v).map_err(|_| format!("unknown value type {}", v))?,
            None => ValueType::Standard
        };

        Ok(ScoreRecord {
            level_id: row.level_uuid.trim().to_string(),
            level_version: row.level_version.unwrap_or(0),
            player_ids,
            value: row.value,
            value_type,
            submitted_at: row.date,
            country: row.country.unwrap_or_default()
        })
    }
}

/// The validated records of one run, plus how many rows were rejected.
#[derive(Debug, Clone, Default)]
pub struct ScoreDataset {
    pub records: Vec<ScoreRecord>,
    pub skipped: usize
}

/// Anything able to hand over a fully materialized score dataset.
pub trait ScoreSource {
    fn load(&self) -> Result<ScoreDataset, SourceError>;
}

/// The score dump CSV on disk.
#[derive(Debug, Clone)]
pub struct CsvScoreSource {
    path: PathBuf
}

impl CsvScoreSource {
    pub fn new(path: impl Into<PathBuf>) -> CsvScoreSource {
        CsvScoreSource { path: path.into() }
    }
}

impl ScoreSource for CsvScoreSource {
    fn load(&self) -> Result<ScoreDataset, SourceError> {
        load_scores(&self.path)
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>, SourceError> {
    csv::Reader::from_path(path).map_err(|e| match e.into_kind() {
        csv::ErrorKind::Io(source) => SourceError::Unavailable {
            path: path.to_path_buf(),
            source
        },
        other => SourceError::malformed(path, format!("{:?}", other))
    })
}

/// Reads and validates the score feed. Unparseable rows are skipped and counted.
pub fn load_scores(path: &Path) -> Result<ScoreDataset, SourceError> {
    let mut reader = open_csv(path)?;
    let mut dataset = ScoreDataset::default();

    for (line, row) in reader.deserialize::<ScoreRow>().enumerate() {
        let parsed = row
            .map_err(|e| e.to_string())
            .and_then(ScoreRecord::try_from);

        match parsed {
            Ok(record) => dataset.records.push(record),
            Err(reason) => {
                debug!(row = line + 1, reason = %reason, "Skipping malformed score row");
                dataset.skipped += 1;
            }
        }
    }

    if dataset.skipped > 0 {
        warn!(path = %path.display(), skipped = dataset.skipped, "Skipped malformed score rows");
    }
    info!(path = %path.display(), records = dataset.records.len(), "Loaded score feed");

    Ok(dataset)
}

#[derive(Debug, Deserialize)]
struct LevelRow {
    #[serde(default)]
    level_uuid: Option<String>
}

/// Reads the `level_uuid` column of the level catalog, in file order.
pub fn load_level_catalog(path: &Path) -> Result<Vec<String>, SourceError> {
    let mut reader = open_csv(path)?;
    let mut levels = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<LevelRow>() {
        match row.map(|r| r.level_uuid) {
            Ok(Some(level)) if !level.trim().is_empty() => levels.push(level.trim().to_string()),
            Ok(_) | Err(_) => skipped += 1
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped level catalog rows without an id");
    }

    Ok(levels)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{load_level_catalog, load_scores, CsvScoreSource, ScoreSource};
    use crate::{ingest::SourceError, model::structures::value_type::ValueType};

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_scores_parses_solo_and_coop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "score_data.csv",
            "level_uuid,level_version,account_ids,value,value_type,date,country\n\
             lvl,2,abc,100,0,19000,FR\n\
             lvl,2,abc|def,-5400,1,19001,DE\n"
        );

        let dataset = CsvScoreSource::new(&path).load().unwrap();

        assert_eq!(dataset.skipped, 0);
        assert_eq!(dataset.records.len(), 2);

        let solo = &dataset.records[0];
        assert_eq!(solo.level_id, "lvl");
        assert_eq!(solo.level_version, 2);
        assert_eq!(solo.player_ids, vec!["abc"]);
        assert_eq!(solo.value_type, ValueType::Standard);
        assert_eq!(solo.country, "FR");

        let coop = &dataset.records[1];
        assert_eq!(coop.player_ids, vec!["abc", "def"]);
        assert_eq!(coop.value, -5400);
        assert_eq!(coop.value_type, ValueType::Speedrun);
        assert_eq!(coop.submitted_at, 19001);
    }

    #[test]
    fn test_legacy_type_column_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "score_data.csv",
            "level_uuid,account_ids,value,type,date\n\
             lvl,abc,100,1,5\n\
             lvl,def,100,,6\n"
        );

        let dataset = load_scores(&path).unwrap();

        assert_eq!(dataset.records[0].value_type, ValueType::Speedrun);
        assert_eq!(dataset.records[0].level_version, 0);
        assert_eq!(dataset.records[0].country, "");
        assert_eq!(dataset.records[1].value_type, ValueType::Standard);
    }

    #[test]
    fn test_malformed_rows_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "score_data.csv",
            "level_uuid,level_version,account_ids,value,value_type,date,country\n\
             lvl,1,abc,not-a-number,0,1,US\n\
             lvl,1,,100,0,1,US\n\
             lvl,1,a|b|c,100,0,1,US\n\
             lvl,1,abc,100,7,1,US\n\
             lvl,1,abc,100,0,1,US\n"
        );

        let dataset = load_scores(&path).unwrap();

        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.skipped, 4);
    }

    #[test]
    fn test_missing_feed_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_scores(&dir.path().join("absent.csv"));

        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }

    #[test]
    fn test_load_level_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "level_data.csv", "level_uuid,name\na,Alpha\n,Nameless\nb,Beta\n");

        assert_eq!(load_level_catalog(&path).unwrap(), vec!["a", "b"]);
    }
}
