//! Storage module for engine state persistence

pub mod persistence;

pub use persistence::{
    read_snapshot, write_snapshot, Snapshot, Storage, StorageConfig, StorageError, StorageStats,
    SNAPSHOT_VERSION,
};
