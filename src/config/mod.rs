//! The extension allow-list: compiled-in defaults merged with custom
//! extensions refreshed periodically from the record store.
//!
//! The merged list is published as an immutable snapshot that is swapped
//! atomically on refresh. Every walk pins one snapshot at start, so a
//! refresh landing mid-walk can never produce a mixed allow-list within a
//! single walk.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::store::ExtensionSource;

/// Extensions treated as text content (lowercase, no leading dot).
const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "adoc", "org", "tex", "bib",
    "rs", "py", "pyi", "js", "jsx", "ts", "tsx", "mjs", "cjs", "java", "c", "cpp", "cc", "h",
    "hpp", "go", "rb", "php", "swift", "kt", "kts", "scala", "clj", "hs", "ml", "fs", "ex",
    "exs", "erl", "lua", "pl", "r", "jl", "dart", "elm", "nim", "zig", "vue", "svelte",
    "html", "htm", "xml", "xhtml", "css", "scss", "sass", "less", "svg",
    "json", "jsonl", "ndjson", "yaml", "yml", "toml", "ini", "cfg", "conf", "properties",
    "env", "example",
    "sql", "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd",
    "gradle", "cmake", "mk", "proto", "graphql", "gql", "prisma", "thrift",
    "csv", "tsv", "log", "diff", "patch", "lock", "ron", "pest",
    "gitignore", "gitattributes", "editorconfig", "npmignore", "dockerignore", "nvmrc",
];

/// Extension-less basenames treated as text (matched lowercased).
const NO_EXTENSION_BASENAMES: &[&str] = &[
    "readme", "license", "licence", "changelog", "contributing", "authors", "notice", "todo",
    "makefile", "gnumakefile", "dockerfile", "containerfile", "vagrantfile", "justfile",
    "rakefile", "gemfile", "guardfile", "procfile", "jenkinsfile", "codeowners",
    ".gitignore", ".gitattributes", ".dockerignore", ".npmrc", ".editorconfig", ".nvmrc",
];

/// An immutable view of the allow-list, pinned by a walk for its duration.
#[derive(Debug)]
pub struct ExtensionSnapshot {
    extensions: HashSet<String>,
    bare_names: HashSet<String>,
}

impl ExtensionSnapshot {
    fn build(custom: &[String]) -> Self {
        let mut extensions: HashSet<String> = DEFAULT_TEXT_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect();

        // Custom entries arrive as ".foo"; store them the same way as the
        // defaults so lookups need a single canonical form.
        for ext in custom {
            let normalized = ext.trim().trim_start_matches('.').to_lowercase();
            if !normalized.is_empty() {
                extensions.insert(normalized);
            }
        }

        let bare_names = NO_EXTENSION_BASENAMES
            .iter()
            .map(|name| name.to_string())
            .collect();

        Self {
            extensions,
            bare_names,
        }
    }

    /// `ext` must already be lowercased, without a leading dot.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    /// `name` must already be lowercased.
    pub fn allows_bare_name(&self, name: &str) -> bool {
        self.bare_names.contains(name)
    }
}

/// Atomically replaceable cache over the merged allow-list.
///
/// This is the only cached state in the engine; ignore rules and project
/// records are read fresh on every operation.
pub struct ExtensionCatalog {
    current: RwLock<Arc<ExtensionSnapshot>>,
}

impl ExtensionCatalog {
    /// Creates a catalog containing only the compiled-in defaults.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(ExtensionSnapshot::build(&[]))),
        }
    }

    /// Returns the current snapshot. Callers hold the `Arc` across an entire
    /// walk rather than re-reading the catalog per file.
    pub fn snapshot(&self) -> Arc<ExtensionSnapshot> {
        self.current
            .read()
            .expect("extension snapshot lock poisoned")
            .clone()
    }

    /// Rebuilds the snapshot from the source and swaps it in.
    ///
    /// A failed read keeps the previous snapshot; the refresh loop must
    /// never take the allow-list down with it.
    pub fn refresh_from(&self, source: &dyn ExtensionSource) {
        match source.custom_extensions() {
            Ok(custom) => {
                let snapshot = Arc::new(ExtensionSnapshot::build(&custom));
                *self
                    .current
                    .write()
                    .expect("extension snapshot lock poisoned") = snapshot;
                tracing::debug!(
                    "Refreshed extension allow-list ({} custom entries)",
                    custom.len()
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to refresh custom extensions: {e:#}; keeping previous snapshot"
                );
            }
        }
    }

    /// Spawns the owned background task that refreshes the catalog on a
    /// fixed interval. The first tick fires immediately.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        source: Arc<dyn ExtensionSource>,
        period: Duration,
    ) -> JoinHandle<()> {
        let catalog = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                catalog.refresh_from(source.as_ref());
            }
        })
    }
}

impl Default for ExtensionCatalog {
    fn default() -> Self {
        Self::new()
    }
}
