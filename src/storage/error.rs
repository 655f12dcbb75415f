//! Storage layer error types
//!
//! All errors that can occur during version-control operations are defined here.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::InvalidNameError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// repo is empty (no commits)
    #[error("repository is empty: no commits found")]
    EmptyRepository,

    /// the commit was not found
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// invalid tag name
    #[error("invalid tag name: {0}")]
    InvalidTagName(#[from] InvalidNameError),

    /// tag already exists
    #[error("tag already exists: {0}")]
    TagAlreadyExists(String),

    /// the path is outside the working tree
    #[error("path is not inside the repository: {0}")]
    OutsideWorkdir(PathBuf),

    /// internal error that shouldn't happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotInitialized(_) | StorageError::CommitNotFound(_)
        )
    }

    /// check if this error is a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::TagAlreadyExists(_))
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
