//! File-backed record store reading a single flat JSON records file.
//!
//! The records file is re-read on every access: ignore rules and projects
//! must be fresh per operation, so nothing here is cached.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use super::{ExtensionSource, IgnoreRule, IgnoreRuleSource, Project, ProjectStore};

const RECORDS_FILE: &str = "records.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RecordsFile {
    projects: Vec<Project>,
    ignore_rules: Vec<IgnoreRule>,
    custom_extensions: Vec<String>,
}

/// Reads projects, ignore rules and custom extensions from one JSON file.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the platform-specific default location of the records file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "contextscan", "ContextScan")
            .map(|dirs| dirs.data_dir().join(RECORDS_FILE))
    }

    fn load(&self) -> Result<RecordsFile> {
        if !self.path.exists() {
            tracing::info!("Records file not found at {:?}, treating as empty", self.path);
            return Ok(RecordsFile::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read records file {:?}", self.path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("malformed records file {:?}", self.path))
    }
}

impl ProjectStore for JsonStore {
    fn project(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.load()?.projects.into_iter().find(|p| p.id == id))
    }

    fn children(&self, parent_id: i64) -> Result<Vec<Project>> {
        Ok(self
            .load()?
            .projects
            .into_iter()
            .filter(|p| p.parent_id == Some(parent_id))
            .collect())
    }
}

impl IgnoreRuleSource for JsonStore {
    fn ignore_rules(&self) -> Result<Vec<IgnoreRule>> {
        Ok(self.load()?.ignore_rules)
    }
}

impl ExtensionSource for JsonStore {
    fn custom_extensions(&self) -> Result<Vec<String>> {
        Ok(self.load()?.custom_extensions)
    }
}
