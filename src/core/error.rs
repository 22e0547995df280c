//! Defines the error type shared by the scanning engine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for scanning operations.
///
/// Directory-level enumeration failures are fatal for serialization and
/// surface here as [`ScanError::Walk`] with the offending path. File-level
/// read failures never propagate: the serializer degrades them to an inline
/// marker and the metrics pass skips the file, logging either way.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The record store has no project with this id.
    #[error("project not found: {0}")]
    ProjectNotFound(i64),

    /// The walk target does not exist.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// The walk target exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The walk target cannot be read due to access control.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory inside the tree could not be enumerated.
    #[error("failed to enumerate directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record store failed, including records that cannot be
    /// normalized to the canonical shape.
    #[error("record store error: {0}")]
    Store(#[from] anyhow::Error),
}
