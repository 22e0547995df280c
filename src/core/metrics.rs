//! Per-file and per-directory size metrics across a project family.

use std::collections::HashMap;
use std::fs;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::ExtensionSnapshot;

use super::classify;
use super::ignore::ResolvedIgnores;
use super::walker::{FailureMode, TreeWalker};
use super::{to_forward_slashes, TreeEntry};

/// Line and token counts for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub relative_path: String,
    /// Segment count of the newline split; a file without a trailing
    /// newline still yields the conventional count.
    pub lines: usize,
    /// `ceil(chars / 4)` — a coarse approximation, not a real tokenizer.
    pub tokens: usize,
}

/// Metrics for a single project, files sorted by line count descending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub project_id: i64,
    pub project_title: String,
    pub total_tokens: usize,
    pub files: Vec<FileRecord>,
}

/// Files-per-directory count, keyed `"<project title>/<directory>"` with
/// `"."` standing in for a project's own root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMetric {
    pub path: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub total_tokens_formatted: String,
    pub per_project: Vec<ProjectMetrics>,
    pub directory_metrics: Vec<DirectoryMetric>,
}

/// Computes size metrics for a resolved project family.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Walks the root project (excluding each direct child's directory so
    /// nothing is double-counted) and then each child independently.
    ///
    /// Walks are best-effort: an unreadable project or subtree is logged
    /// and simply contributes no records.
    pub fn aggregate(ignores: &ResolvedIgnores, snapshot: &ExtensionSnapshot) -> MetricsReport {
        let mut per_project = Vec::new();
        let mut directory_counts: HashMap<String, usize> = HashMap::new();

        for (index, project) in ignores.projects.iter().enumerate() {
            // While walking the root, each direct child is an excluded
            // leaf; the children are walked on their own below.
            let excluded: Vec<_> = if index == 0 {
                ignores.projects[1..]
                    .iter()
                    .map(|child| child.directory.clone())
                    .collect()
            } else {
                Vec::new()
            };

            let walker = TreeWalker::new(ignores, &excluded);
            let entries = match walker.walk(&project.directory, &project.directory, FailureMode::Lenient)
            {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Skipping project '{}' ({}): {e}",
                        project.title,
                        project.directory.display()
                    );
                    Vec::new()
                }
            };

            let mut files: Vec<FileRecord> = entries
                .par_iter()
                .filter(|entry| {
                    !entry.is_directory && classify::is_text_candidate(&entry.path, snapshot)
                })
                .filter_map(Self::measure)
                .collect();

            // Parallel collection order is not deterministic; the sorted
            // order is the external contract.
            files.sort_by(|a, b| {
                b.lines
                    .cmp(&a.lines)
                    .then_with(|| a.relative_path.cmp(&b.relative_path))
            });

            for record in &files {
                let key = format!("{}/{}", project.title, parent_key(&record.relative_path));
                *directory_counts.entry(key).or_default() += 1;
            }

            per_project.push(ProjectMetrics {
                project_id: project.id,
                project_title: project.title.clone(),
                total_tokens: files.iter().map(|f| f.tokens).sum(),
                files,
            });
        }

        let mut directory_metrics: Vec<DirectoryMetric> = directory_counts
            .into_iter()
            .map(|(path, file_count)| DirectoryMetric { path, file_count })
            .collect();
        directory_metrics.sort_by(|a, b| {
            b.file_count
                .cmp(&a.file_count)
                .then_with(|| a.path.cmp(&b.path))
        });

        let grand_total: usize = per_project.iter().map(|p| p.total_tokens).sum();

        MetricsReport {
            total_tokens_formatted: format_token_total(grand_total),
            per_project,
            directory_metrics,
        }
    }

    fn measure(entry: &TreeEntry) -> Option<FileRecord> {
        let content = match fs::read_to_string(&entry.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}; skipping", entry.path.display());
                return None;
            }
        };

        Some(FileRecord {
            relative_path: to_forward_slashes(&entry.relative),
            lines: content.split('\n').count(),
            tokens: approximate_token_count(&content),
        })
    }
}

/// Relative directory of a forward-slash path, `"."` for root-level files.
fn parent_key(relative_path: &str) -> &str {
    match relative_path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => ".",
    }
}

/// Character count divided by four, rounded up.
pub fn approximate_token_count(content: &str) -> usize {
    content.chars().count().div_ceil(4)
}

/// Formats a grand total: plain below 1000, otherwise one decimal with a
/// `K` suffix.
pub fn format_token_total(total: usize) -> String {
    if total < 1000 {
        total.to_string()
    } else {
        format!("{:.1}K", total as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionCatalog;
    use crate::store::Project;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_token_count_rounds_up() {
        assert_eq!(approximate_token_count(&"a".repeat(400)), 100);
        assert_eq!(approximate_token_count(&"a".repeat(401)), 101);
        assert_eq!(approximate_token_count(""), 0);
        assert_eq!(approximate_token_count("abc"), 1);
    }

    #[test]
    fn test_token_total_formatting() {
        assert_eq!(format_token_total(0), "0");
        assert_eq!(format_token_total(999), "999");
        assert_eq!(format_token_total(1000), "1.0K");
        assert_eq!(format_token_total(1234), "1.2K");
        assert_eq!(format_token_total(1987654), "1987.7K");
    }

    #[test]
    fn test_parent_key() {
        assert_eq!(parent_key("a.js"), ".");
        assert_eq!(parent_key("src/a.js"), "src");
        assert_eq!(parent_key("src/deep/a.js"), "src/deep");
    }

    fn project_at(id: i64, title: &str, directory: &Path) -> Project {
        Project {
            id,
            title: title.to_string(),
            directory: directory.to_path_buf(),
            parent_id: None,
        }
    }

    #[test]
    fn test_aggregate_counts_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.js"), "x\ny\nz\n").unwrap();
        std::fs::write(dir.path().join("src/b.js"), "x\n").unwrap();
        std::fs::write(dir.path().join("README"), "one\ntwo").unwrap();
        std::fs::write(dir.path().join("image.png"), b"\x00").unwrap();

        let ignores = ResolvedIgnores {
            projects: vec![project_at(1, "Demo", dir.path())],
            ..Default::default()
        };
        let snapshot = ExtensionCatalog::new().snapshot();
        let report = MetricsAggregator::aggregate(&ignores, &snapshot);

        assert_eq!(report.per_project.len(), 1);
        let demo = &report.per_project[0];

        // "x\ny\nz\n" splits into four segments; the png never becomes a
        // record because it is not a text candidate.
        assert_eq!(demo.files.len(), 3);
        assert_eq!(demo.files[0].relative_path, "src/a.js");
        assert_eq!(demo.files[0].lines, 4);
        assert_eq!(demo.files[1].relative_path, "README");
        assert_eq!(demo.files[1].lines, 2);
        assert_eq!(demo.files[2].relative_path, "src/b.js");
        assert_eq!(demo.files[2].lines, 2);

        assert_eq!(
            report.directory_metrics,
            vec![
                DirectoryMetric {
                    path: "Demo/src".to_string(),
                    file_count: 2
                },
                DirectoryMetric {
                    path: "Demo/.".to_string(),
                    file_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_missing_project_directory_degrades() {
        let dir = TempDir::new().unwrap();
        let ignores = ResolvedIgnores {
            projects: vec![project_at(1, "Gone", &dir.path().join("missing"))],
            ..Default::default()
        };
        let snapshot = ExtensionCatalog::new().snapshot();
        let report = MetricsAggregator::aggregate(&ignores, &snapshot);

        assert_eq!(report.per_project.len(), 1);
        assert!(report.per_project[0].files.is_empty());
        assert_eq!(report.total_tokens_formatted, "0");
    }
}
