//! Engine state persistence
//!
//! The engine lives in one versioned JSON snapshot. Reading a snapshot runs
//! the same checks as [`StakingClaim::initialize`], so an edited file cannot
//! produce an engine that initialization would have refused. Writes go
//! through a temporary file and an atomic rename, and the snapshot being
//! replaced is kept as a numbered backup (0 is the most recent).

use crate::engine::{EngineError, StakingClaim};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Snapshot layout version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("State file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("Snapshot holds an invalid engine: {0}")]
    InvalidState(#[from] EngineError),
}

/// Persisted engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<E = StakingClaim> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub engine: E,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    /// Snapshots kept after being replaced; 0 disables backups
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".staking_claim"),
            state_file: "staking_claim.json".to_string(),
            max_backups: 5,
        }
    }
}

/// Engine snapshot store for one data directory
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Open a store, creating the data directory if needed
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Persist `engine`, returning the snapshot timestamp
    pub fn save(&self, engine: &StakingClaim) -> Result<DateTime<Utc>, StorageError> {
        let path = self.state_path();
        if path.exists() && self.config.max_backups > 0 {
            self.shift_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = path.with_extension("tmp");
        let saved_at = write_snapshot(engine, &temp_path)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("Engine snapshot written to {}", path.display());
        Ok(saved_at)
    }

    /// Read and validate the current snapshot
    pub fn load(&self) -> Result<Snapshot, StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Err(StorageError::NotFound(path));
        }
        read_snapshot(&path)
    }

    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Existing backup files, most recent first
    pub fn backups(&self) -> Vec<PathBuf> {
        (0..self.config.max_backups)
            .map(|i| self.backup_path(i))
            .filter(|path| path.exists())
            .collect()
    }

    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.state_path();
        let file_size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }

    /// Move backup i to i + 1, dropping the oldest
    fn shift_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for i in (1..self.config.max_backups).rev() {
            let newer = self.backup_path(i - 1);
            if newer.exists() {
                fs::rename(&newer, self.backup_path(i))?;
            }
        }
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Write `engine` as a snapshot at `path`
pub fn write_snapshot(engine: &StakingClaim, path: &Path) -> Result<DateTime<Utc>, StorageError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        engine,
    };
    let writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(writer, &snapshot)?;
    Ok(snapshot.saved_at)
}

/// Read a snapshot from `path`, rejecting unknown versions and invalid engines
pub fn read_snapshot(path: &Path) -> Result<Snapshot, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let snapshot: Snapshot = serde_json::from_reader(reader)?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion(snapshot.version));
    }
    snapshot.engine.validate()?;

    Ok(snapshot)
}
