//! JSON documents: the roster and race snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use super::{StorageConfig, StorageError};
use crate::models::{ExportSnapshot, RosterPayload};

/// Write pretty JSON via a temp file and rename, so readers never see half a file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a JSON document. Missing files are an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }
    let contents = fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}

pub fn write_roster(config: &StorageConfig, roster: &RosterPayload) -> Result<(), StorageError> {
    write_json(&config.roster_path(), roster)
}

pub fn read_roster(config: &StorageConfig) -> Result<RosterPayload, StorageError> {
    read_json(&config.roster_path())
}

/// Persist the current snapshot.
pub fn write_snapshot(config: &StorageConfig, snapshot: &ExportSnapshot) -> Result<(), StorageError> {
    write_json(&config.snapshot_path(), snapshot)?;
    info!(
        "Saved snapshot at stage {} to {:?}",
        snapshot.current_stage,
        config.snapshot_path()
    );
    Ok(())
}

/// Load the persisted snapshot, if there is one.
pub fn read_snapshot(config: &StorageConfig) -> Result<Option<ExportSnapshot>, StorageError> {
    match read_json(&config.snapshot_path()) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(StorageError::PathNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Export file name for a snapshot, e.g. `pool-stage-07-20250712T181500Z.json`.
pub fn export_filename(current_stage: u32, at: DateTime<Utc>) -> String {
    format!(
        "pool-stage-{:02}-{}.json",
        current_stage,
        at.format("%Y%m%dT%H%M%SZ")
    )
}

/// Write a timestamped export into the exports directory.
pub fn write_export(config: &StorageConfig, snapshot: &ExportSnapshot) -> Result<PathBuf, StorageError> {
    let path = config
        .exports_dir()
        .join(export_filename(snapshot.current_stage, snapshot.export_date));
    write_json(&path, snapshot)?;
    info!("Exported snapshot to {:?}", path);
    Ok(path)
}
