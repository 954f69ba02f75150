//! Lockfile contents and relocation of path-relative references.

use crate::bundler::{Result, error::ErrorExt};
use regex::{Captures, Regex};
use serde_json::Value;
use std::{path::Path, sync::LazyLock};

/// Parsed lockfile content.
#[derive(Clone, Debug, PartialEq)]
pub enum Lockfile {
    /// JSON lockfile (npm)
    Json(Value),
    /// Text lockfile (yarn, pnpm)
    Text(String),
    /// Opaque binary lockfile (bun)
    Binary(Vec<u8>),
}

impl Lockfile {
    /// Loads a lockfile, choosing the representation from its name and content.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.fs_context("reading lockfile", path)?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");

        if is_json {
            return Ok(Lockfile::Json(serde_json::from_slice(&bytes)?));
        }
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Lockfile::Text(text),
            Err(e) => Lockfile::Binary(e.into_bytes()),
        })
    }

    /// Serialized bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Lockfile::Json(value) => serde_json::to_vec_pretty(value)?,
            Lockfile::Text(text) => text.clone().into_bytes(),
            Lockfile::Binary(bytes) => bytes.clone(),
        })
    }

    /// Writes the lockfile to `path`.
    pub async fn write(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_bytes()?)
            .await
            .fs_context("writing lockfile", path)
    }
}

static FILE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:file:(?:\.{1,2}/|[^/]{2})|\.{1,2}/)").expect("valid regex")
});

static YARN_FILE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^"/]@(?:file:)?((?:\./|\.\./).*?)[":,]"#).expect("valid regex")
});

/// Prefixes a relative `file:` or `./`/`../` reference with `new_root`.
///
/// Other versions are returned unchanged.
pub fn rebase_file_reference(new_root: &str, version: &str) -> String {
    if !FILE_REFERENCE.is_match(version) {
        return version.to_string();
    }
    let (prefix, path) = match version.strip_prefix("file:") {
        Some(rest) => ("file:", rest),
        None => ("", version),
    };
    format!("{prefix}{new_root}/{path}").replace('\\', "/")
}

/// Rebases `version` fields recursively through `dependencies` maps.
pub fn rebase_json_lockfile(new_root: &str, node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };

    if let Some(Value::String(version)) = map.get_mut("version") {
        *version = rebase_file_reference(new_root, version);
    }

    if let Some(Value::Object(deps)) = map.get_mut("dependencies") {
        for dep in deps.values_mut() {
            rebase_json_lockfile(new_root, dep);
        }
    }
}

/// Rebases `@file:../x` and `@../x` references in a yarn.lock text.
pub fn rebase_yarn_lockfile(new_root: &str, text: &str) -> String {
    YARN_FILE_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let Some(reference) = caps.get(1) else {
                return whole.to_string();
            };
            let start = reference.start() - caps.get(0).map_or(0, |m| m.start());
            let end = start + reference.as_str().len();
            let rebased = format!("{new_root}/{}", reference.as_str()).replace('\\', "/");
            format!("{}{}{}", &whole[..start], rebased, &whole[end..])
        })
        .into_owned()
}
