//! Filesystem persistence.
//!
//! Layout under the data directory:
//! - `roster.json`: the drafted roster the race was started from
//! - `state/snapshot.json`: latest export snapshot
//! - `stages/stages.jsonl`: append-only log of applied stage payloads
//! - `exports/`: timestamped snapshot exports

mod jsonl;
mod snapshot;

pub use jsonl::*;
pub use snapshot::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Corrupt line {line} in {path}: {source}")]
    CorruptLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join("roster.json")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir().join("snapshot.json")
    }

    pub fn stages_dir(&self) -> PathBuf {
        self.data_dir.join("stages")
    }

    pub fn stage_log_path(&self) -> PathBuf {
        self.stages_dir().join("stages.jsonl")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
