//! Record types and collaborator traits for the external record store.
//!
//! Projects and ignore rules are owned and mutated by the record-store
//! service; this crate only reads them. The legacy nested ignore-rule
//! encoding is normalized here, once, at the decode boundary, so the core
//! never branches on record shape.

pub mod json;

use std::path::PathBuf;

use anyhow::Result;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

/// A registered directory, optionally linked to a parent as a sub-project.
///
/// Nesting is a single level deep: a project with a `parent_id` is never
/// itself a parent as far as this engine is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub directory: PathBuf,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Scope of an ignore rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreScope {
    #[serde(rename = "global")]
    Global,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "sub-project")]
    Subproject,
}

/// An exact-basename exclusion applied during traversal.
///
/// `path` is a plain basename, never a glob or a path with separators.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreRule {
    pub id: i64,
    pub path: String,
    pub scope: IgnoreScope,
    pub project_id: Option<i64>,
}

/// Wire shape for `IgnoreRule::path`.
///
/// Older store versions persisted the whole rule body inside the `path`
/// field; both shapes must decode to the canonical flat rule.
#[derive(Deserialize)]
#[serde(untagged)]
enum PathField {
    Name(String),
    Legacy(LegacyPath),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPath {
    path: String,
    #[serde(default)]
    scope: Option<IgnoreScope>,
    #[serde(default)]
    project_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIgnoreRule {
    id: i64,
    path: PathField,
    #[serde(default)]
    scope: Option<IgnoreScope>,
    #[serde(default)]
    project_id: Option<i64>,
}

impl<'de> Deserialize<'de> for IgnoreRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawIgnoreRule::deserialize(deserializer)?;

        // Values carried inside the legacy nested body win over the outer
        // fields; a rule that names a scope nowhere cannot be normalized.
        let (name, scope, project_id) = match raw.path {
            PathField::Name(name) => (name, raw.scope, raw.project_id),
            PathField::Legacy(body) => (
                body.path,
                body.scope.or(raw.scope),
                body.project_id.or(raw.project_id),
            ),
        };

        let scope = scope.ok_or_else(|| {
            D::Error::custom(format!("ignore rule {} carries no scope", raw.id))
        })?;

        Ok(IgnoreRule {
            id: raw.id,
            path: name,
            scope,
            project_id,
        })
    }
}

/// Read-only access to project records.
pub trait ProjectStore: Send + Sync {
    /// Looks up a single project. `Ok(None)` means the id is unknown.
    fn project(&self, id: i64) -> Result<Option<Project>>;

    /// Returns the direct children of a project, in record order.
    fn children(&self, parent_id: i64) -> Result<Vec<Project>>;
}

/// Read-only access to ignore-rule records, normalized to the flat shape.
pub trait IgnoreRuleSource: Send + Sync {
    fn ignore_rules(&self) -> Result<Vec<IgnoreRule>>;
}

/// Source of user-configured text extensions (each beginning with `.`).
pub trait ExtensionSource: Send + Sync {
    fn custom_extensions(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_rule_decodes() {
        let rule: IgnoreRule = serde_json::from_str(
            r#"{"id": 1, "path": "node_modules", "scope": "global", "projectId": null}"#,
        )
        .unwrap();

        assert_eq!(rule.path, "node_modules");
        assert_eq!(rule.scope, IgnoreScope::Global);
        assert_eq!(rule.project_id, None);
    }

    #[test]
    fn test_legacy_nested_rule_is_normalized() {
        let rule: IgnoreRule = serde_json::from_str(
            r#"{"id": 2, "path": {"path": "dist", "scope": "project", "projectId": 7}}"#,
        )
        .unwrap();

        assert_eq!(rule.path, "dist");
        assert_eq!(rule.scope, IgnoreScope::Project);
        assert_eq!(rule.project_id, Some(7));
    }

    #[test]
    fn test_nested_fields_win_over_outer_fields() {
        let rule: IgnoreRule = serde_json::from_str(
            r#"{"id": 3, "scope": "global", "projectId": 1,
                "path": {"path": "build", "scope": "sub-project", "projectId": 9}}"#,
        )
        .unwrap();

        assert_eq!(rule.scope, IgnoreScope::Subproject);
        assert_eq!(rule.project_id, Some(9));
    }

    #[test]
    fn test_nested_rule_falls_back_to_outer_scope() {
        let rule: IgnoreRule =
            serde_json::from_str(r#"{"id": 4, "scope": "project", "projectId": 2, "path": {"path": "tmp"}}"#)
                .unwrap();

        assert_eq!(rule.path, "tmp");
        assert_eq!(rule.scope, IgnoreScope::Project);
        assert_eq!(rule.project_id, Some(2));
    }

    #[test]
    fn test_rule_without_scope_is_rejected() {
        let result = serde_json::from_str::<IgnoreRule>(r#"{"id": 5, "path": "vendor"}"#);
        assert!(result.is_err(), "a rule naming no scope cannot be normalized");
    }

    #[test]
    fn test_rule_with_unrecognized_path_shape_is_rejected() {
        let result = serde_json::from_str::<IgnoreRule>(r#"{"id": 6, "path": 42, "scope": "global"}"#);
        assert!(result.is_err());
    }
}
