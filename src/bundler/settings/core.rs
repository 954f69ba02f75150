//! Core BuildSettings struct and implementations.

use super::{Externals, ModuleFormat, Platform};
use crate::bundler::packager::PackagerKind;
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

/// Configuration keys consumed by the orchestrator itself.
///
/// None of these may reach a compiler invocation.
pub const ORCHESTRATOR_KEYS: &[&str] = &[
    "concurrency",
    "exclude",
    "external",
    "functions",
    "individually",
    "installExtraArgs",
    "keepOutputDirectory",
    "nativeZip",
    "outputBuildFolder",
    "outputDir",
    "packagePatterns",
    "packager",
    "packagerOptions",
    "servicePath",
    "skipBuild",
    "watch",
];

/// Removes orchestrator-only keys from a compiler pass-through map.
pub fn strip_orchestrator_keys(options: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    options
        .iter()
        .filter(|(key, _)| !ORCHESTRATOR_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Maximum number of entry points handed to one compiler call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Concurrency {
    /// Every entry point in a single call
    #[default]
    Unbounded,
    /// At most this many entry points per call
    Limit(NonZeroUsize),
}

impl Concurrency {
    /// `0` is treated as unbounded.
    pub fn from_limit(limit: usize) -> Self {
        NonZeroUsize::new(limit).map_or(Concurrency::Unbounded, Concurrency::Limit)
    }
}

impl<'de> Deserialize<'de> for Concurrency {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(usize),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Concurrency::from_limit(n)),
            Raw::Text(s) if s.eq_ignore_ascii_case("infinity") => Ok(Concurrency::Unbounded),
            Raw::Text(s) => s
                .parse::<usize>()
                .map(Concurrency::from_limit)
                .map_err(|_| serde::de::Error::custom(format!("invalid concurrency: {s}"))),
        }
    }
}

/// Options forwarded to the package manager.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagerOptions {
    /// Manifest scripts run after installing externals.
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Skip installing externals entirely.
    #[serde(default)]
    pub no_install: bool,
    /// Arguments appended to every install invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Effective options for one build and packaging run.
///
/// Constructed via [`super::SettingsBuilder`] and read-only afterwards.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    pub(super) service_path: PathBuf,
    pub(super) build_dir: PathBuf,
    pub(super) output_dir: PathBuf,
    pub(super) platform: Platform,
    pub(super) format: Option<ModuleFormat>,
    pub(super) target: String,
    pub(super) out_extension: String,
    pub(super) concurrency: Concurrency,
    pub(super) exclude: Vec<String>,
    pub(super) externals: Externals,
    pub(super) packager: PackagerKind,
    pub(super) packager_options: PackagerOptions,
    pub(super) install_extra_args: Vec<String>,
    pub(super) native_zip: bool,
    pub(super) skip_build: bool,
    pub(super) metafile: bool,
    pub(super) keep_output_directory: bool,
    pub(super) individually: bool,
    pub(super) package_patterns: Vec<String>,
    pub(super) pass_through: BTreeMap<String, Value>,
}

impl BuildSettings {
    /// Service root; entry paths are relative to it.
    pub fn service_path(&self) -> &Path {
        &self.service_path
    }

    /// Directory the compiler writes bundles into.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory archives are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Explicit module format, if any.
    pub fn format(&self) -> Option<ModuleFormat> {
        self.format
    }

    /// Compiler target, e.g. `node18`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Output file extension including the dot.
    pub fn out_extension(&self) -> &str {
        &self.out_extension
    }

    /// Entry points per compiler call.
    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Packages excluded from the deployment artifact.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Normalized external packages.
    pub fn externals(&self) -> &Externals {
        &self.externals
    }

    /// Selected package manager.
    pub fn packager(&self) -> PackagerKind {
        self.packager
    }

    /// Package manager options.
    pub fn packager_options(&self) -> &PackagerOptions {
        &self.packager_options
    }

    /// Extra arguments appended to install invocations.
    pub fn install_extra_args(&self) -> &[String] {
        &self.install_extra_args
    }

    /// Whether archives are produced by the system `zip` binary.
    pub fn native_zip(&self) -> bool {
        self.native_zip
    }

    /// Whether the compiler is bypassed and existing bundles are reused.
    pub fn skip_build(&self) -> bool {
        self.skip_build
    }

    /// Whether the compiler metafile is written as `meta.json`.
    pub fn metafile(&self) -> bool {
        self.metafile
    }

    /// Whether the build directory survives packaging.
    pub fn keep_output_directory(&self) -> bool {
        self.keep_output_directory
    }

    /// One archive per function instead of one per service.
    pub fn individually(&self) -> bool {
        self.individually
    }

    /// Extra glob patterns (relative to the build directory) added to archives.
    pub fn package_patterns(&self) -> &[String] {
        &self.package_patterns
    }

    /// Compiler pass-through options with orchestrator keys removed.
    pub fn compiler_pass_through(&self) -> BTreeMap<String, Value> {
        strip_orchestrator_keys(&self.pass_through)
    }

    /// Service name derived from the service directory.
    pub fn service_name(&self) -> String {
        self.service_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "service".to_string())
    }
}
