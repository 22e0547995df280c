//! Renders walked entries as an ASCII directory tree.

use std::collections::HashMap;
use std::path::Path;

use super::TreeEntry;

/// Stateless renderer for the tree section of a serialized project.
///
/// Entries must already be in walk order; children render in exactly that
/// order so the tree lines agree with the content blocks that follow them.
pub struct TreeRenderer;

impl TreeRenderer {
    /// Renders the root basename line plus connector lines for `entries`.
    pub fn render(root: &Path, entries: &[TreeEntry]) -> String {
        let mut children: HashMap<&Path, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(parent) = entry.path.parent() {
                children.entry(parent).or_default().push(idx);
            }
        }

        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let mut result = String::new();
        result.push_str(&root_name);
        result.push('\n');
        Self::render_children(root, &children, entries, "", &mut result);
        result
    }

    fn render_children(
        dir: &Path,
        children: &HashMap<&Path, Vec<usize>>,
        entries: &[TreeEntry],
        prefix: &str,
        result: &mut String,
    ) {
        let Some(indices) = children.get(dir) else {
            return;
        };

        for (i, &idx) in indices.iter().enumerate() {
            let entry = &entries[idx];
            let is_last = i == indices.len() - 1;

            let connector = if is_last { "└── " } else { "├── " };
            result.push_str(prefix);
            result.push_str(connector);
            result.push_str(&entry.name);
            result.push('\n');

            if entry.is_directory {
                let child_prefix = if is_last {
                    format!("{prefix}    ")
                } else {
                    format!("{prefix}│   ")
                };
                Self::render_children(&entry.path, children, entries, &child_prefix, result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(base: &str, relative: &str, is_directory: bool) -> TreeEntry {
        let relative = PathBuf::from(relative);
        TreeEntry {
            path: PathBuf::from(base).join(&relative),
            name: relative
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
            depth: relative.components().count(),
            relative,
            is_directory,
        }
    }

    #[test]
    fn test_renders_connectors_and_prefixes() {
        let base = "/tmp/project";
        let entries = vec![
            entry(base, "src", true),
            entry(base, "src/lib.rs", false),
            entry(base, "src/main.rs", false),
            entry(base, "README.md", false),
        ];

        let rendered = TreeRenderer::render(Path::new(base), &entries);
        let expected = "\
project
├── src
│   ├── lib.rs
│   └── main.rs
└── README.md
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_last_directory_uses_space_prefix() {
        let base = "/tmp/p";
        let entries = vec![
            entry(base, "a.txt", false),
            entry(base, "sub", true),
            entry(base, "sub/deep", true),
            entry(base, "sub/deep/leaf.txt", false),
        ];

        let rendered = TreeRenderer::render(Path::new(base), &entries);
        let expected = "\
p
├── a.txt
└── sub
    └── deep
        └── leaf.txt
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_empty_walk_renders_root_line_only() {
        let rendered = TreeRenderer::render(Path::new("/tmp/empty"), &[]);
        assert_eq!(rendered, "empty\n");
    }
}
