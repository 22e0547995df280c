//! The engine façade wiring the record store and extension catalog together.
//!
//! This is the surface the external HTTP layer calls. Record stores are
//! consulted fresh on every operation; the extension catalog is the only
//! cached state and each operation pins one snapshot at entry.

use std::path::Path;
use std::sync::Arc;

use crate::config::ExtensionCatalog;
use crate::core::{
    ContentSerializer, IgnoreResolver, MetricsAggregator, MetricsReport, ScanError,
    SerializedProject,
};
use crate::store::{IgnoreRuleSource, ProjectStore};

/// Entry point for analyze and metrics operations.
pub struct Engine {
    projects: Arc<dyn ProjectStore>,
    rules: Arc<dyn IgnoreRuleSource>,
    catalog: Arc<ExtensionCatalog>,
}

impl Engine {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        rules: Arc<dyn IgnoreRuleSource>,
        catalog: Arc<ExtensionCatalog>,
    ) -> Self {
        Self {
            projects,
            rules,
            catalog,
        }
    }

    /// Serializes `directory` into a tree listing with embedded contents.
    ///
    /// Global ignore rules always apply; with a `project_id` the scoped
    /// rules of that project and its direct children apply as well. Each
    /// excluded sub-project id resolves to its directory, which the walk
    /// treats as an invisible leaf.
    pub fn analyze(
        &self,
        directory: &Path,
        project_id: Option<i64>,
        excluded_subprojects: &[i64],
    ) -> Result<SerializedProject, ScanError> {
        let ignores = match project_id {
            Some(id) => {
                IgnoreResolver::resolve(self.projects.as_ref(), self.rules.as_ref(), id)?
            }
            None => IgnoreResolver::resolve_global(self.rules.as_ref())?,
        };

        let mut excluded_dirs = Vec::with_capacity(excluded_subprojects.len());
        for id in excluded_subprojects {
            let project = self
                .projects
                .project(*id)?
                .ok_or(ScanError::ProjectNotFound(*id))?;
            excluded_dirs.push(project.directory);
        }

        let snapshot = self.catalog.snapshot();
        ContentSerializer::serialize(directory, &ignores, &excluded_dirs, &snapshot)
    }

    /// Computes size metrics for `project_id` and its direct children.
    pub fn metrics(&self, project_id: i64) -> Result<MetricsReport, ScanError> {
        let ignores =
            IgnoreResolver::resolve(self.projects.as_ref(), self.rules.as_ref(), project_id)?;
        let snapshot = self.catalog.snapshot();
        Ok(MetricsAggregator::aggregate(&ignores, &snapshot))
    }
}
