//! Archive error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors raised while packing or reading notebook archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Error from the zip codec.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error while walking or writing files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory to pack does not exist or is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An entry exists but is not valid UTF-8 text.
    #[error("entry {name} is not valid utf-8")]
    NotText { name: String },
}
