//! Deterministic, filtered directory traversal.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::ScanError;
use super::ignore::ResolvedIgnores;
use super::TreeEntry;

/// How directory enumeration failures are handled during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Any unreadable directory aborts the whole walk. A partial listing
    /// must never masquerade as a complete one.
    Strict,
    /// Unreadable directories are logged and their subtrees contribute
    /// nothing; the rest of the walk continues.
    Lenient,
}

/// Walks a directory tree, applying resolved ignore rules and a list of
/// excluded sub-project leaves.
///
/// Entries come back in depth-first order with siblings sorted by name, so
/// repeated walks of an unchanged tree are byte-for-byte reproducible
/// downstream. OS enumeration order is never relied upon.
pub struct TreeWalker<'a> {
    ignores: &'a ResolvedIgnores,
    excluded_dirs: &'a [PathBuf],
}

impl<'a> TreeWalker<'a> {
    pub fn new(ignores: &'a ResolvedIgnores, excluded_dirs: &'a [PathBuf]) -> Self {
        Self {
            ignores,
            excluded_dirs,
        }
    }

    /// Walks `root`, yielding the surviving entries. Relative paths are
    /// computed against `base`, which is `root` itself for whole-tree
    /// serialization.
    pub fn walk(
        &self,
        root: &Path,
        base: &Path,
        mode: FailureMode,
    ) -> Result<Vec<TreeEntry>, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::PathNotFound(root.to_path_buf()),
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(root.to_path_buf()),
            _ => ScanError::Walk {
                path: root.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut entries = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.survives(entry.path()));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));

                    match mode {
                        FailureMode::Strict => {
                            return Err(
                                if source.kind() == io::ErrorKind::PermissionDenied && path == root
                                {
                                    ScanError::PermissionDenied(path)
                                } else {
                                    ScanError::Walk { path, source }
                                },
                            );
                        }
                        FailureMode::Lenient => {
                            tracing::warn!(
                                "Skipping unreadable directory {}: {source}",
                                path.display()
                            );
                            continue;
                        }
                    }
                }
            };

            // The root itself is the walk target, not an entry.
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path().to_path_buf();
            let relative = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
            entries.push(TreeEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: entry.file_type().is_dir(),
                depth: entry.depth(),
                relative,
                path,
            });
        }

        Ok(entries)
    }

    /// Drop filter applied to every candidate entry.
    fn survives(&self, path: &Path) -> bool {
        // Excluded sub-project directories are leaves: not descended into,
        // not emitted at all.
        if self.excluded_dirs.iter().any(|excluded| excluded == path) {
            return false;
        }

        match (path.parent(), path.file_name().and_then(|n| n.to_str())) {
            (Some(parent), Some(name)) => !self.ignores.is_ignored(parent, name),
            _ => true,
        }
    }
}
