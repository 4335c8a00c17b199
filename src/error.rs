//! Error handling for the songbook catalog
//!
//! Errors are split into two classes that callers must be able to tell apart:
//! `NotFound` when an identifier does not exist, and `Storage` for every
//! data-access fault. A duplicate insert is not an error at all.

use rusqlite::ffi;
use std::time::Duration;
use thiserror::Error;

use crate::core::models::SongId;

#[derive(Error, Debug)]
pub enum SongbookError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Song {id} not found ({operation})")]
    NotFound { operation: &'static str, id: SongId },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SongbookError {
    pub fn not_found(operation: &'static str, id: SongId) -> Self {
        SongbookError::NotFound { operation, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SongbookError::NotFound { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, SongbookError::Storage(_))
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("{operation} failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Schema bootstrap failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Database corruption detected during {operation}")]
    Corruption { operation: &'static str },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Wrap a driver error raised while running `operation`.
    pub fn query(operation: &'static str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(
                ffi::Error {
                    code: ffi::ErrorCode::DatabaseCorrupt,
                    ..
                },
                _,
            ) => StorageError::Corruption { operation },
            _ => StorageError::Query {
                operation,
                source: err,
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to determine project directories")]
    ProjectDirs,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SongbookError>;

impl From<tokio::task::JoinError> for SongbookError {
    fn from(err: tokio::task::JoinError) -> Self {
        SongbookError::Storage(StorageError::Task(err))
    }
}
