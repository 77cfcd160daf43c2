use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::feature::{FeaturePayload, FeatureRecord};

/// On-disk form of one feature record.
///
/// Kept separate from [`FeatureRecord`] so the snapshot format does not
/// silently follow changes to the in-memory layout.
#[derive(Serialize)]
struct WireRecord<'a> {
    name: &'a str,
    lsn: u64,
    feature: &'a FeaturePayload,
}

#[derive(Deserialize)]
struct WireRecordOwned {
    name: String,
    lsn: u64,
    feature: FeaturePayload,
}

/// Whole-state dump: a single JSON object mapping feature id to its record.
///
/// Saves are whole-file replacements; a save interrupted mid-write is
/// recovered by the next WAL replay, not here.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the full map, replacing any previous snapshot.
    pub fn save(&self, data: &HashMap<String, FeatureRecord>) -> Result<(), StorageError> {
        let wire: HashMap<&String, WireRecord<'_>> = data
            .iter()
            .map(|(id, record)| {
                (
                    id,
                    WireRecord {
                        name: &record.origin,
                        lsn: record.lsn,
                        feature: &record.payload,
                    },
                )
            })
            .collect();
        let bytes = serde_json::to_vec(&wire)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Load the map back. A missing file is `None`, not an error.
    pub fn load(&self) -> Result<Option<HashMap<String, FeatureRecord>>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let wire: HashMap<String, WireRecordOwned> = serde_json::from_slice(&bytes)?;
        let data = wire
            .into_iter()
            .map(|(id, record)| {
                (
                    id,
                    FeatureRecord {
                        origin: record.name,
                        lsn: record.lsn,
                        payload: record.feature,
                    },
                )
            })
            .collect();
        Ok(Some(data))
    }
}
