//! esbuild invoked as an external process.

use super::compiler::{Compiler, CompilerOptions, CompilerOutput};
use crate::bundler::{
    Result,
    error::ErrorExt,
    utils::{ResourceScope, spawn_process},
};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Compiler backed by the `esbuild` command line.
#[derive(Clone, Debug)]
pub struct EsbuildCompiler {
    binary: PathBuf,
}

impl Default for EsbuildCompiler {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("esbuild"),
        }
    }
}

impl EsbuildCompiler {
    /// Uses the given esbuild executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Prefers `node_modules/.bin/esbuild` under `service_path`, then `PATH`.
    pub fn locate(service_path: &Path) -> Self {
        let local = service_path.join("node_modules").join(".bin").join("esbuild");
        if local.is_file() {
            return Self::with_binary(local);
        }
        match which::which("esbuild") {
            Ok(path) => Self::with_binary(path),
            Err(e) => {
                log::debug!("esbuild not found in PATH: {}", e);
                Self::default()
            }
        }
    }

    /// Command line arguments for one invocation.
    pub fn args(options: &CompilerOptions, metafile: Option<&Path>) -> Vec<String> {
        let mut args = options.entry_points.clone();

        args.push("--bundle".to_string());
        args.push(format!("--outdir={}", options.outdir.display()));
        args.push(format!("--outbase={}", options.outbase.display()));
        args.push(format!("--platform={}", options.platform));
        if let Some(format) = options.format {
            args.push(format!("--format={format}"));
        }
        args.push(format!("--target={}", options.target));
        if options.out_extension != ".js" {
            args.push(format!("--out-extension:.js={}", options.out_extension));
        }
        for name in &options.external {
            args.push(format!("--external:{name}"));
        }
        if let Some(path) = metafile {
            args.push(format!("--metafile={}", path.display()));
        }
        for (key, value) in &options.pass_through {
            render_flag(&mut args, &kebab_case(key), value);
        }

        args
    }
}

#[async_trait]
impl Compiler for EsbuildCompiler {
    async fn build(&self, options: &CompilerOptions) -> Result<CompilerOutput> {
        let scratch = if options.metafile {
            Some(ResourceScope::acquire("esbuild-meta")?)
        } else {
            None
        };
        let metafile_path = scratch.as_ref().map(|s| s.path().join("meta.json"));

        let args = Self::args(options, metafile_path.as_deref());
        let binary = self.binary.to_string_lossy();
        spawn_process(&binary, &args, &options.working_dir).await?;

        let metafile = match &metafile_path {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .fs_context("reading esbuild metafile", path)?;
                Some(serde_json::from_str::<Value>(&content)?)
            }
            None => None,
        };
        if let Some(scratch) = scratch {
            scratch.release()?;
        }

        let mut output_files = Vec::new();
        for entry in &options.entry_points {
            let relative = Path::new(entry)
                .strip_prefix(&options.outbase)
                .unwrap_or(Path::new(entry))
                .with_extension(options.out_extension.trim_start_matches('.'));
            let path = options.outdir.join(relative);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                output_files.push(path);
            }
        }

        Ok(CompilerOutput {
            output_files,
            metafile,
        })
    }
}

/// List options esbuild takes as a single comma separated value.
const COMMA_LIST_FLAGS: &[&str] = &["main-fields", "resolve-extensions", "conditions"];

fn render_flag(args: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => args.push(format!("--{key}")),
        Value::String(s) => args.push(format!("--{key}={s}")),
        Value::Number(n) => args.push(format!("--{key}={n}")),
        Value::Array(items) if COMMA_LIST_FLAGS.contains(&key) => {
            let joined: Vec<String> = items.iter().map(scalar_text).collect();
            args.push(format!("--{key}={}", joined.join(",")));
        }
        Value::Array(items) => {
            for item in items {
                args.push(format!("--{key}:{}", scalar_text(item)));
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                args.push(format!("--{key}:{name}={}", scalar_text(item)));
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
