//! The filesystem scanning and ignore-resolution engine.

pub mod classify;
pub mod error;
pub mod ignore;
pub mod metrics;
pub mod serializer;
pub mod tree;
pub mod walker;

use std::path::{Path, PathBuf};

/// A single surviving entry produced during a walk. Transient, never
/// persisted.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Path relative to the walk's base directory.
    pub relative: PathBuf,
    /// Basename of the entry.
    pub name: String,
    pub is_directory: bool,
    /// Depth below the walk root (direct children are at 1).
    pub depth: usize,
}

/// Renders a relative path with forward slashes regardless of platform.
pub(crate) fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub use error::ScanError;
pub use ignore::{IgnoreResolver, ResolvedIgnores};
pub use metrics::{
    DirectoryMetric, FileRecord, MetricsAggregator, MetricsReport, ProjectMetrics,
};
pub use serializer::{ContentSerializer, SerializedProject};
pub use walker::{FailureMode, TreeWalker};
