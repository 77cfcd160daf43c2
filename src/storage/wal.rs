use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::feature::Transaction;

/// Append-only write-ahead log, one JSON transaction per line.
///
/// The file handle is opened and closed per operation; a successful `append`
/// has written and closed the file before returning, which is the engine's
/// durability point. Concurrent external mutation of the path is not
/// supported.
pub struct WalStore {
    path: PathBuf,
}

impl WalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one transaction, creating the parent directory and file on
    /// first use.
    pub fn append(&self, tx: &Transaction) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_vec(tx)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }

    /// All transactions in append order. Lines that fail to parse are logged
    /// and skipped; a missing file is an empty log.
    pub fn load(&self) -> Result<Vec<Transaction>, StorageError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut transactions = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Transaction>(&line) {
                Ok(tx) => transactions.push(tx),
                Err(err) => {
                    tracing::warn!("Skipping malformed WAL line {}: {}", number + 1, err);
                }
            }
        }

        Ok(transactions)
    }

    /// Empty the log. Called only after a successful snapshot, which holds
    /// everything the truncated entries described.
    pub fn truncate(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&self.path)?;
        Ok(())
    }
}
