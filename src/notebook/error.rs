//! Notebook error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::storage::StorageError;

/// Result type for notebook operations.
pub type NotebookResult<T> = Result<T, NotebookError>;

/// Errors raised by the notebook lifecycle.
#[derive(Debug, Error)]
pub enum NotebookError {
    /// No display name was supplied for a new notebook.
    #[error("the notebook's name must be defined during creation")]
    NameRequired,

    /// The name sanitizes to something that cannot name a directory.
    #[error("the notebook name {0:?} cannot be used as a directory name")]
    UnusableName(String),

    /// The creation target is a symbolic link.
    #[error("the path specified is a symlink: {0}")]
    PathIsSymlink(PathBuf),

    /// The creation target exists but is not a directory.
    #[error("the path specified is not a directory: {0}")]
    PathNotDirectory(PathBuf),

    /// Something that is not an empty directory already sits at the target.
    #[error("file {0} already exists")]
    TargetExists(PathBuf),

    /// The notebook directory already has entries.
    #[error("directory {0} is not empty")]
    TargetNotEmpty(PathBuf),

    /// The notebook has no config.yml.
    #[error("config.yml not found in {0}")]
    ConfigNotFound(PathBuf),

    /// config.yml is not valid YAML.
    #[error("cannot parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// config.yml parsed but a required field is missing or empty.
    #[error("invalid notebook configuration in {path}: {field} must be defined")]
    ConfigInvalid { path: PathBuf, field: &'static str },

    /// The archive has no config.yml entry.
    #[error("config.yml not found in archive {0}")]
    ConfigEntryMissing(PathBuf),

    /// An unpacked archive was opened without the path of its artifact.
    #[error("no nominal path provided for compressed notebook")]
    NominalPathRequired,

    /// The archive path has no usable file name or parent directory.
    #[error("invalid archive path: {0}")]
    ArchivePathInvalid(PathBuf),

    /// A collection directory could not be listed.
    #[error("cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the notebook repository failed.
    #[error("failed to initialize repository at {path}: {source}")]
    RepositoryInitFailed {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Opening the notebook repository failed.
    #[error("failed to open repository at {path}: {source}")]
    RepositoryOpenFailed {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Save committed the scratch copy but the artifact could not be rewritten.
    #[error("notebook saved but archive {path} could not be updated: {source}")]
    ArchiveSyncFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// The background initialization did not finish in time.
    #[error("notebook initialization did not complete within {0:?}")]
    InitTimeout(Duration),

    /// The requested operation has no implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Version-control error outside init/open.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Archive error outside save.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error that shouldn't happen.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NotebookError {
    /// Check if this error comes from validating the caller's input,
    /// before anything was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NotebookError::NameRequired
                | NotebookError::UnusableName(_)
                | NotebookError::PathIsSymlink(_)
                | NotebookError::PathNotDirectory(_)
                | NotebookError::TargetExists(_)
                | NotebookError::TargetNotEmpty(_)
                | NotebookError::NominalPathRequired
                | NotebookError::ArchivePathInvalid(_)
        )
    }

    /// Check if this error means the notebook (or part of it) is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            NotebookError::ConfigNotFound(_) | NotebookError::ConfigEntryMissing(_) => true,
            NotebookError::RepositoryOpenFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
