//! Error type definitions for the Tahap progress service
//!
//! The progress engine has exactly two client-error kinds (`InvalidStage`,
//! `InvalidSubtask`). Everything else is an infrastructure failure and must
//! never be reported as "0% complete".

use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Progress engine errors
    #[error("{0}")]
    Tahap(#[from] TahapError),

    /// Invalid stage schema or other start-up configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Stored subtask payload could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Persisted value outside of the domain range (e.g. tahap 0 in a row)
    #[error("Corrupt record: {table} - {message}")]
    CorruptRecord { table: String, message: String },
}

/// Progress engine errors
#[derive(Error, Debug)]
pub enum TahapError {
    /// Stage number outside 1..=8
    #[error("Invalid tahap: {0}")]
    InvalidStage(i64),

    /// Subtask index outside the schema range for the stage
    #[error("Invalid subtahap: {0}")]
    InvalidSubtask(i64),

    /// Underlying storage failure
    #[error("Storage failure: {0}")]
    Repository(#[from] RepositoryError),

    /// Storage call exceeded the configured timeout
    #[error("Storage operation '{operation}' timed out after {after:?}")]
    StorageTimeout {
        operation: &'static str,
        after: Duration,
    },
}

impl TahapError {
    /// Whether this is a caller mistake (bad stage or subtask index)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidStage(_) | Self::InvalidSubtask(_))
    }
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl RepositoryError {
    pub fn corrupt<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        Self::CorruptRecord {
            table: table.into(),
            message: message.into(),
        }
    }
}
