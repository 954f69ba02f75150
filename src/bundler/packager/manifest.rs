//! Manifest (`package.json`) reading and production dependency extraction.

use crate::bundler::{Result, error::ErrorExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path};

/// Manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// Declared version of one dependency.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DependencyInfo {
    /// Version range or reference as written in the manifest
    pub version: String,
}

/// Production dependencies of one manifest.
///
/// Built fresh on every read; never cached.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependenciesResult {
    /// Dependency name to declared version
    pub dependencies: BTreeMap<String, DependencyInfo>,
}

impl DependenciesResult {
    /// Extracts the `dependencies` section of a parsed manifest.
    ///
    /// Entries whose version is not a string are ignored.
    pub fn from_manifest(manifest: &Value) -> Self {
        let dependencies = manifest
            .get("dependencies")
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, version)| {
                        version.as_str().map(|v| {
                            (
                                name.clone(),
                                DependencyInfo {
                                    version: v.to_string(),
                                },
                            )
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { dependencies }
    }

    /// Declared version of `name`.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.dependencies.get(name).map(|d| d.version.as_str())
    }
}

/// Reads and parses the manifest in `dir`.
pub async fn read_manifest(dir: &Path) -> Result<Value> {
    let path = dir.join(MANIFEST_NAME);
    let content = tokio::fs::read_to_string(&path)
        .await
        .fs_context("reading manifest", &path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Production dependencies declared in `dir/package.json`.
///
/// A missing or malformed manifest yields an empty set.
pub async fn read_prod_dependencies(dir: &Path) -> DependenciesResult {
    match read_manifest(dir).await {
        Ok(manifest) => DependenciesResult::from_manifest(&manifest),
        Err(e) => {
            log::debug!("No usable manifest in {}: {}", dir.display(), e);
            DependenciesResult::default()
        }
    }
}
