//! Batch build orchestration.
//!
//! This module provides the [`BatchBuildOrchestrator`] that deduplicates entry
//! points, compiles them in bounded batches, and maps the produced bundles back
//! to the functions that declared them.

use super::{
    batch::{bundle_path_for, partition, unique_entry_paths},
    compiler::{Compiler, CompilerOptions, CompilerOutput, merge_metafiles},
};
use crate::bundler::{
    Error, Result,
    error::ErrorExt,
    settings::{BuildSettings, FunctionEntry, FunctionHandle, validate_out_extension},
    utils::fs,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Name of the metafile written into the build directory.
pub const METAFILE_NAME: &str = "meta.json";

/// Build output for one unique entry point.
#[derive(Clone, Debug)]
pub struct FileBuildResult {
    /// Bundle path relative to the build directory
    pub bundle_path: String,
    /// Entry path the bundle was built from
    pub entry_path: String,
    /// Compiler output of the batch that produced this bundle; `None` when the build was skipped
    pub raw: Option<Arc<CompilerOutput>>,
}

/// Build output for one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionBuildResult {
    /// Bundle path relative to the build directory
    pub bundle_path: String,
    /// Function definition
    pub function: FunctionHandle,
    /// Function alias
    pub alias: String,
}

/// Main build orchestrator.
///
/// Invokes the external compiler once per batch of unique entry points,
/// strictly one batch after another, and maps results back to functions.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use fnpack::bundler::{BatchBuildOrchestrator, EsbuildCompiler, FunctionEntry, SettingsBuilder};
///
/// # async fn example(entries: Vec<FunctionEntry>) -> fnpack::bundler::Result<()> {
/// let settings = SettingsBuilder::new().service_path(".").build()?;
/// let compiler = Arc::new(EsbuildCompiler::locate(settings.service_path()));
/// let orchestrator = BatchBuildOrchestrator::new(settings, compiler);
///
/// for result in orchestrator.build(&entries).await? {
///     println!("{} -> {}", result.alias, result.bundle_path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BatchBuildOrchestrator {
    settings: BuildSettings,
    compiler: Arc<dyn Compiler>,
}

impl std::fmt::Debug for BatchBuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchBuildOrchestrator")
            .field("settings", &self.settings)
            .field("compiler", &"<dyn Compiler>")
            .finish()
    }
}

impl BatchBuildOrchestrator {
    /// Creates a new orchestrator with the given settings and compiler.
    pub fn new(settings: BuildSettings, compiler: Arc<dyn Compiler>) -> Self {
        Self { settings, compiler }
    }

    /// Returns a reference to the build settings.
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Builds every function and returns one result per resolvable function.
    ///
    /// Functions whose entry path produced no bundle, or that carry no function
    /// definition, are left out of the result without error.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an output extension that contradicts the module
    ///   format, before the compiler is invoked
    /// - [`Error::Compiler`] when any batch fails; later batches are not started
    pub async fn build(&self, entries: &[FunctionEntry]) -> Result<Vec<FunctionBuildResult>> {
        let files = self.build_files(entries).await?;
        Ok(map_functions(entries, &files))
    }

    /// Builds every unique entry point and returns one result per entry path.
    ///
    /// In skip-build mode no compiler call is made; expected bundle paths are
    /// computed against the existing build directory instead.
    pub async fn build_files(&self, entries: &[FunctionEntry]) -> Result<Vec<FileBuildResult>> {
        let unique = unique_entry_paths(entries);

        if self.settings.skip_build() {
            log::info!(
                "Skipping compilation, reusing bundles in {}",
                self.settings.build_dir().display()
            );
            return Ok(unique
                .into_iter()
                .map(|entry_path| FileBuildResult {
                    bundle_path: bundle_path_for(&entry_path, self.settings.out_extension()),
                    entry_path,
                    raw: None,
                })
                .collect());
        }

        validate_out_extension(
            self.settings.platform(),
            self.settings.format(),
            self.settings.out_extension(),
        )?;

        let base = self.base_options();
        let batches = partition(&unique, self.settings.concurrency());

        fs::create_dir_all(self.settings.build_dir(), true).await?;

        let mut files = Vec::with_capacity(unique.len());
        let mut metafile: Option<Value> = None;

        for (index, batch) in batches.into_iter().enumerate() {
            log::info!(
                "Compiling batch {} ({} entry points)",
                index + 1,
                batch.len()
            );

            let options = CompilerOptions {
                entry_points: batch,
                ..base.clone()
            };
            let mut output = self
                .compiler
                .build(&options)
                .await
                .map_err(|source| Error::Compiler {
                    batch: index,
                    source: Box::new(source),
                })?;

            if self.settings.metafile() {
                if let Some(meta) = output.metafile.take() {
                    match metafile.as_mut() {
                        Some(existing) => merge_metafiles(existing, meta),
                        None => metafile = Some(meta),
                    }
                }
            }

            let output = Arc::new(output);
            for entry_path in options.entry_points {
                files.push(FileBuildResult {
                    bundle_path: bundle_path_for(&entry_path, self.settings.out_extension()),
                    entry_path,
                    raw: Some(Arc::clone(&output)),
                });
            }
        }

        if let Some(meta) = metafile {
            write_metafile(self.settings.build_dir(), &meta).await?;
        }

        log::info!("✓ Built {} entry points", files.len());

        Ok(files)
    }

    /// Compiler options shared by every batch.
    fn base_options(&self) -> CompilerOptions {
        let settings = &self.settings;
        CompilerOptions {
            entry_points: Vec::new(),
            working_dir: settings.service_path().to_path_buf(),
            outdir: settings.build_dir().to_path_buf(),
            outbase: PathBuf::from("."),
            platform: settings.platform(),
            format: settings.format(),
            target: settings.target().to_string(),
            out_extension: settings.out_extension().to_string(),
            external: settings.externals().compiler_externals(settings.exclude()),
            metafile: settings.metafile(),
            pass_through: settings.compiler_pass_through(),
        }
    }
}

/// Resolves each function against the built files by entry path.
pub fn map_functions(entries: &[FunctionEntry], files: &[FileBuildResult]) -> Vec<FunctionBuildResult> {
    let by_entry: HashMap<&str, &FileBuildResult> = files
        .iter()
        .map(|file| (file.entry_path.as_str(), file))
        .collect();

    entries
        .iter()
        .filter_map(|entry| {
            let file = by_entry.get(entry.entry_path.as_str())?;
            let function = entry.function.clone()?;
            Some(FunctionBuildResult {
                bundle_path: file.bundle_path.clone(),
                function,
                alias: entry.alias.clone(),
            })
        })
        .collect()
}

async fn write_metafile(build_dir: &Path, meta: &Value) -> Result<()> {
    let path = build_dir.join(METAFILE_NAME);
    let content = serde_json::to_vec(meta)?;
    tokio::fs::write(&path, content)
        .await
        .fs_context("writing metafile", &path)
}
