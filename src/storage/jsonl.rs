//! JSONL (JSON Lines) storage.
//!
//! The stage log is the source of truth for applied results: each line is one
//! stage payload as it was applied, so the race can be rebuilt by replaying it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{write_snapshot, StorageConfig, StorageError};
use crate::models::{ExportSnapshot, StageResult};

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.append_all(std::slice::from_ref(entity))
    }

    /// Append entities in one write. Every entity is serialized before the
    /// file is opened, so a serialization error leaves the file untouched.
    pub fn append_all(&self, entities: &[T]) -> Result<(), StorageError> {
        let mut lines = String::new();
        for entity in entities {
            lines.push_str(&serde_json::to_string(entity)?);
            lines.push('\n');
        }

        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(lines.as_bytes())?;
        file.flush()?;

        debug!("Appended {} entities to {:?}", entities.len(), self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file. Blank lines are ignored; any other
    /// unparseable line fails the whole read with its line number.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entity = serde_json::from_str(&line).map_err(|source| {
                warn!("Failed to parse line {} in {:?}: {}", i + 1, self.path, source);
                StorageError::CorruptLine {
                    path: self.path.clone(),
                    line: i + 1,
                    source,
                }
            })?;
            entities.push(entity);
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// One line of the stage log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub applied_at: DateTime<Utc>,
    pub result: StageResult,
}

impl StageRecord {
    pub fn now(result: StageResult) -> Self {
        Self {
            applied_at: Utc::now(),
            result,
        }
    }
}

/// Persist newly applied stages: the snapshot first, then the log.
///
/// A failed snapshot write leaves the log untouched. A failed log append
/// writes `previous` back so the snapshot never runs ahead of the log.
pub fn commit_stages(
    config: &StorageConfig,
    records: &[StageRecord],
    snapshot: &ExportSnapshot,
    previous: &ExportSnapshot,
) -> Result<(), StorageError> {
    write_snapshot(config, snapshot)?;

    if let Err(e) = JsonlWriter::new(config.stage_log_path()).append_all(records) {
        error!("Stage log append failed, restoring previous snapshot: {}", e);
        if let Err(restore) = write_snapshot(config, previous) {
            error!("Failed to restore previous snapshot: {}", restore);
        }
        return Err(e);
    }

    info!("Committed {} stage(s) at stage {}", records.len(), snapshot.current_stage);
    Ok(())
}

/// Every applied stage, in application order.
pub fn read_stage_log(config: &StorageConfig) -> Result<Vec<StageRecord>, StorageError> {
    JsonlReader::new(config.stage_log_path()).read_all()
}

/// Replace the log, e.g. when a new roster starts a new race.
pub fn write_stage_log(config: &StorageConfig, records: &[StageRecord]) -> Result<usize, StorageError> {
    JsonlWriter::new(config.stage_log_path()).write_all(records)
}
