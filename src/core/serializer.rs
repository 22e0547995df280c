//! Serializes a project tree — structure plus embedded file contents — for
//! consumption by an external text-generation process.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::ExtensionSnapshot;

use super::classify;
use super::error::ScanError;
use super::ignore::ResolvedIgnores;
use super::tree::TreeRenderer;
use super::walker::{FailureMode, TreeWalker};
use super::{to_forward_slashes, TreeEntry};

const BINARY_PLACEHOLDER: &str = "Binary file - content not displayed";

/// The serialized document plus its base64 encoding.
///
/// `base64` always decodes back to the UTF-8 bytes of `text`.
#[derive(Debug, Clone, Serialize)]
pub struct SerializedProject {
    pub text: String,
    pub base64: String,
}

/// Builds the serialized document for one directory tree.
pub struct ContentSerializer;

impl ContentSerializer {
    /// Walks `root` strictly and assembles the document.
    ///
    /// Any unreadable directory aborts the whole serialization — a partial
    /// document would silently mislead a consumer relying on completeness.
    /// Unreadable individual files degrade to an inline marker instead.
    pub fn serialize(
        root: &Path,
        ignores: &ResolvedIgnores,
        excluded_dirs: &[PathBuf],
        snapshot: &ExtensionSnapshot,
    ) -> Result<SerializedProject, ScanError> {
        let walker = TreeWalker::new(ignores, excluded_dirs);
        let entries = walker.walk(root, root, FailureMode::Strict)?;

        let mut document = TreeRenderer::render(root, &entries);
        document.push('\n');

        for entry in entries.iter().filter(|e| !e.is_directory) {
            Self::push_file_block(&mut document, entry, snapshot);
        }

        let text = document.trim_end().to_string();
        // Encoded straight from the in-memory document; no temporary file
        // to clean up on any exit path.
        let base64 = STANDARD.encode(text.as_bytes());

        tracing::debug!(
            "Serialized {} ({} entries, {} bytes)",
            root.display(),
            entries.len(),
            text.len()
        );

        Ok(SerializedProject { text, base64 })
    }

    fn push_file_block(document: &mut String, entry: &TreeEntry, snapshot: &ExtensionSnapshot) {
        document.push_str("[FILEPATH:");
        document.push_str(&to_forward_slashes(&entry.relative));
        document.push_str("]\n");

        if classify::is_text_file(&entry.path, snapshot) {
            match fs::read_to_string(&entry.path) {
                Ok(content) => {
                    document.push_str(&content);
                    // Keep the closing marker on its own line.
                    if !content.ends_with('\n') {
                        document.push('\n');
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {e}", entry.path.display());
                    document.push_str(&format!("<error reading file: {e}>\n"));
                }
            }
        } else {
            document.push_str(BINARY_PLACEHOLDER);
            document.push('\n');
        }

        document.push_str("[/FILEPATH]\n\n");
    }
}
