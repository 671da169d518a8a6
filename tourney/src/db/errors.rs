//! Storage error types.

use thiserror::Error;

use crate::tournament::TournamentId;

/// Storage errors
///
/// Kept apart from [`TournamentError`](crate::tournament::TournamentError):
/// these say nothing about whether a command was legal.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No tournament row with this id
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// Row decoded but holds values the engine cannot use
    #[error("Corrupt tournament record {id}: {reason}")]
    Corrupt { id: TournamentId, reason: String },
}

impl StorageError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            StorageError::Database(_) => "Internal storage error".to_string(),
            StorageError::Serialization(_) | StorageError::Corrupt { .. } => {
                "Tournament data is unreadable".to_string()
            }
            StorageError::NotFound(_) => "Tournament not found".to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
