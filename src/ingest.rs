//! Reading roster and stage result files from disk.
//!
//! Stage files are plain JSON `StageResult` documents. When a file leaves out
//! the `stage` field, the number is taken from its name (`stage-3.json`,
//! `etappe_03.json`, `rit3.json`).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Jersey, JerseyHolder, Placing, RosterPayload, StageResult};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No stage number in {0} and none could be read from its name")]
    MissingStage(PathBuf),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to list files: {0}")]
    Glob(#[from] glob::GlobError),
}

/// A stage file as written by hand: `stage` may be absent.
#[derive(Debug, Deserialize)]
struct StageFile {
    #[serde(default)]
    stage: Option<u32>,
    #[serde(default)]
    top10: Vec<Placing>,
    #[serde(default)]
    jerseys: std::collections::BTreeMap<Jersey, JerseyHolder>,
    #[serde(default)]
    dropouts: Vec<String>,
}

fn stage_name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:stage|etappe|rit)[-_ ]?0*(\d{1,2})").ok())
        .as_ref()
}

/// Stage number from a file name, if it carries one.
pub fn stage_from_filename(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let caps = stage_name_regex()?.captures(stem)?;
    caps.get(1)?.as_str().parse().ok()
}

fn read_file(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a roster document.
pub fn read_roster_file(path: &Path) -> Result<RosterPayload, IngestError> {
    let contents = read_file(path)?;
    let roster: RosterPayload =
        serde_json::from_str(&contents).map_err(|source| IngestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(
        "Read roster from {:?}: {} participants",
        path,
        roster.participants.len()
    );
    Ok(roster)
}

/// Read one stage file, falling back to the file name for the stage number.
pub fn read_stage_file(path: &Path) -> Result<StageResult, IngestError> {
    let contents = read_file(path)?;
    let file: StageFile = serde_json::from_str(&contents).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let stage = match file.stage.or_else(|| stage_from_filename(path)) {
        Some(stage) => stage,
        None => return Err(IngestError::MissingStage(path.to_path_buf())),
    };

    debug!("Read stage {} from {:?}", stage, path);
    Ok(StageResult {
        stage,
        top10: file.top10,
        jerseys: file.jerseys,
        dropouts: file.dropouts,
    })
}

/// Read every `*.json` stage file in `dir`, ordered by stage number.
///
/// Files for the same stage keep their name order, so a later correction
/// file (`stage-3b.json`) is applied after the first one.
pub fn read_stage_dir(dir: &Path) -> Result<Vec<StageResult>, IngestError> {
    let pattern = dir.join("*.json");
    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    let mut stages = paths
        .iter()
        .map(|path| read_stage_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    stages.sort_by_key(|s| s.stage);

    info!("Read {} stage files from {:?}", stages.len(), dir);
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_from_filename() {
        assert_eq!(stage_from_filename(Path::new("stage-3.json")), Some(3));
        assert_eq!(stage_from_filename(Path::new("etappe_03.json")), Some(3));
        assert_eq!(stage_from_filename(Path::new("rit21.json")), Some(21));
        assert_eq!(stage_from_filename(Path::new("Stage 22.json")), Some(22));
        assert_eq!(stage_from_filename(Path::new("results.json")), None);
    }

    #[test]
    fn test_read_stage_file_with_explicit_stage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("whatever.json");
        std::fs::write(
            &path,
            r#"{
                "stage": 4,
                "top10": [{"position": 1, "rider": "Tadej Pogačar", "points": 30}],
                "jerseys": {"yellow": {"rider": "Tadej Pogačar"}},
                "dropouts": ["Mark Cavendish"]
            }"#,
        )
        .unwrap();

        let stage = read_stage_file(&path).unwrap();
        assert_eq!(stage.stage, 4);
        assert_eq!(stage.top10[0].points, Some(30));
        assert!(stage.jerseys.contains_key(&Jersey::Geel));
        assert_eq!(stage.dropouts, vec!["Mark Cavendish".to_string()]);
    }

    #[test]
    fn test_read_stage_file_takes_stage_from_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("etappe_07.json");
        std::fs::write(&path, r#"{"top10": [{"position": 1, "rider": "X"}]}"#).unwrap();

        let stage = read_stage_file(&path).unwrap();
        assert_eq!(stage.stage, 7);
        assert_eq!(stage.top10[0].points, None);
    }

    #[test]
    fn test_read_stage_file_without_stage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json");
        std::fs::write(&path, r#"{"top10": []}"#).unwrap();

        assert!(matches!(
            read_stage_file(&path),
            Err(IngestError::MissingStage(_))
        ));
    }

    #[test]
    fn test_read_stage_file_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stage-1.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            read_stage_file(&path),
            Err(IngestError::Parse { .. })
        ));
    }

    #[test]
    fn test_read_stage_dir_orders_by_stage() {
        let temp_dir = TempDir::new().unwrap();
        for (name, body) in [
            ("stage-10.json", r#"{}"#),
            ("stage-2.json", r#"{}"#),
            ("stage-2b.json", r#"{"top10": [{"position": 1, "rider": "X"}]}"#),
            ("notes.txt", "ignored"),
        ] {
            std::fs::write(temp_dir.path().join(name), body).unwrap();
        }

        let stages = read_stage_dir(temp_dir.path()).unwrap();
        let numbers: Vec<u32> = stages.iter().map(|s| s.stage).collect();
        assert_eq!(numbers, vec![2, 2, 10]);
        assert!(stages[0].top10.is_empty());
        assert_eq!(stages[1].top10.len(), 1);
    }

    #[test]
    fn test_read_roster_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"{"participants": [{"name": "Anna", "riders": [{"name": "X", "team": "UAE"}]}]}"#,
        )
        .unwrap();

        let roster = read_roster_file(&path).unwrap();
        assert_eq!(roster.participants[0].name, "Anna");
        assert_eq!(roster.universe().len(), 1);
    }

    #[test]
    fn test_read_roster_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            read_roster_file(&temp_dir.path().join("none.json")),
            Err(IngestError::Read { .. })
        ));
    }
}
