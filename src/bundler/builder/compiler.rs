//! External compiler contract.
//!
//! The orchestrator treats the compiler as a black box: it hands over one
//! batch of entry points plus the filtered options, and reads back the
//! produced files and an optional metafile.

use crate::bundler::{
    Result,
    settings::{ModuleFormat, Platform},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::BTreeMap, path::PathBuf};

/// Options for a single compiler invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerOptions {
    /// Entry points of this batch, relative to `working_dir`
    pub entry_points: Vec<String>,
    /// Directory the compiler runs in
    pub working_dir: PathBuf,
    /// Output directory
    pub outdir: PathBuf,
    /// Base directory output paths are computed from
    pub outbase: PathBuf,
    /// Target platform
    pub platform: Platform,
    /// Module format, compiler default when `None`
    pub format: Option<ModuleFormat>,
    /// Compiler target
    pub target: String,
    /// Extension mapped from `.js` in output file names
    pub out_extension: String,
    /// Packages left unbundled
    pub external: Vec<String>,
    /// Whether to request a metafile
    pub metafile: bool,
    /// Remaining options forwarded verbatim
    pub pass_through: BTreeMap<String, Value>,
}

/// Result of one compiler invocation.
#[derive(Clone, Debug, Default)]
pub struct CompilerOutput {
    /// Files written by the compiler
    pub output_files: Vec<PathBuf>,
    /// Build metadata when requested
    pub metafile: Option<Value>,
}

/// An external compiler invoked once per batch.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compiles one batch of entry points.
    async fn build(&self, options: &CompilerOptions) -> Result<CompilerOutput>;
}

/// Extends the `inputs` and `outputs` maps of `target` with those of `other`.
pub fn merge_metafiles(target: &mut Value, other: Value) {
    let Value::Object(other) = other else {
        return;
    };
    let Value::Object(target) = target else {
        *target = Value::Object(other);
        return;
    };

    for (key, value) in other {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                existing.extend(incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metafiles_merge_inputs_and_outputs() {
        let mut meta = json!({"inputs": {"a.ts": {}}, "outputs": {"a.js": {}}});
        merge_metafiles(
            &mut meta,
            json!({"inputs": {"b.ts": {}}, "outputs": {"b.js": {}}}),
        );
        assert_eq!(meta["inputs"].as_object().unwrap().len(), 2);
        assert_eq!(meta["outputs"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn merge_into_null_takes_incoming() {
        let mut meta = Value::Null;
        merge_metafiles(&mut meta, json!({"inputs": {}}));
        assert_eq!(meta, json!({"inputs": {}}));
    }
}
