//! Resolves ignore rules across global, project and sub-project scopes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::store::{IgnoreRuleSource, IgnoreScope, Project, ProjectStore};

use super::error::ScanError;

/// The resolved ignore sets for one root project and its direct children.
///
/// Only one level below the root is considered; grandchildren are never
/// resolved.
#[derive(Debug, Default)]
pub struct ResolvedIgnores {
    /// Basenames excluded in every directory at every depth.
    pub global_names: HashSet<String>,
    /// Basenames excluded within one project's subtree, keyed by project id.
    pub per_project_names: HashMap<i64, HashSet<String>>,
    /// The root project followed by its direct children.
    pub projects: Vec<Project>,
}

impl ResolvedIgnores {
    /// Returns `true` when the entry `name` inside `parent_dir` is excluded.
    ///
    /// Matching is exact-basename and case-sensitive. A project's own names
    /// apply only when its directory is an ancestor of, or equal to, the
    /// entry's parent directory.
    pub fn is_ignored(&self, parent_dir: &Path, name: &str) -> bool {
        if self.global_names.contains(name) {
            return true;
        }

        self.projects.iter().any(|project| {
            parent_dir.starts_with(&project.directory)
                && self
                    .per_project_names
                    .get(&project.id)
                    .is_some_and(|names| names.contains(name))
        })
    }
}

/// Stateless resolver turning raw rule records into per-walk ignore sets.
///
/// Rules are read fresh from the source on every resolution; nothing here
/// is cached.
pub struct IgnoreResolver;

impl IgnoreResolver {
    /// Resolves the ignore sets for `root_id`.
    ///
    /// Both project- and sub-project-scoped rules attach to the project
    /// whose id equals the rule's `project_id`; an empty rule set is valid.
    pub fn resolve(
        projects: &dyn ProjectStore,
        rules: &dyn IgnoreRuleSource,
        root_id: i64,
    ) -> Result<ResolvedIgnores, ScanError> {
        let root = projects
            .project(root_id)?
            .ok_or(ScanError::ProjectNotFound(root_id))?;
        let children = projects.children(root_id)?;
        let all_rules = rules.ignore_rules()?;

        let global_names: HashSet<String> = all_rules
            .iter()
            .filter(|rule| rule.scope == IgnoreScope::Global)
            .map(|rule| rule.path.clone())
            .collect();

        let mut scoped = Vec::with_capacity(1 + children.len());
        scoped.push(root);
        scoped.extend(children);

        let mut per_project_names = HashMap::new();
        for project in &scoped {
            let names: HashSet<String> = all_rules
                .iter()
                .filter(|rule| {
                    matches!(rule.scope, IgnoreScope::Project | IgnoreScope::Subproject)
                        && rule.project_id == Some(project.id)
                })
                .map(|rule| rule.path.clone())
                .collect();
            per_project_names.insert(project.id, names);
        }

        tracing::debug!(
            "Resolved {} global and {} scoped ignore sets for project {}",
            global_names.len(),
            per_project_names.len(),
            root_id
        );

        Ok(ResolvedIgnores {
            global_names,
            per_project_names,
            projects: scoped,
        })
    }

    /// Resolves global rules only, for walks not tied to a registered
    /// project.
    pub fn resolve_global(rules: &dyn IgnoreRuleSource) -> Result<ResolvedIgnores, ScanError> {
        let global_names = rules
            .ignore_rules()?
            .into_iter()
            .filter(|rule| rule.scope == IgnoreScope::Global)
            .map(|rule| rule.path)
            .collect();

        Ok(ResolvedIgnores {
            global_names,
            ..Default::default()
        })
    }
}
