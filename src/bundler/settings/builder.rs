//! Builder for constructing BuildSettings.

use super::{
    BuildSettings, Concurrency, ExternalSpec, Externals, ModuleFormat, PackagerOptions, Platform,
};
use crate::bundler::{
    Error, Result,
    error::{Context, ErrorExt},
    packager::PackagerKind,
};
use path_absolutize::Absolutize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Default compiler target.
pub const DEFAULT_TARGET: &str = "node18";

/// Default output extension.
pub const DEFAULT_OUT_EXTENSION: &str = ".js";

/// Builder for constructing [`BuildSettings`].
///
/// # Examples
///
/// ```no_run
/// use fnpack::bundler::{Concurrency, SettingsBuilder};
///
/// # fn example() -> fnpack::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .service_path("/srv/api")
///     .concurrency(Concurrency::from_limit(4))
///     .out_extension(".cjs")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    service_path: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    platform: Platform,
    format: Option<ModuleFormat>,
    target: Option<String>,
    out_extension: Option<String>,
    concurrency: Concurrency,
    exclude: Option<Vec<String>>,
    external: Vec<ExternalSpec>,
    packager: PackagerKind,
    packager_options: PackagerOptions,
    install_extra_args: Vec<String>,
    native_zip: bool,
    skip_build: bool,
    metafile: bool,
    keep_output_directory: bool,
    individually: bool,
    package_patterns: Vec<String>,
    pass_through: BTreeMap<String, Value>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the service root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn service_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.service_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the compiler output directory.
    ///
    /// The directory is erased before building, so it may not be the
    /// service root or one of its ancestors.
    ///
    /// Default: `<service>/.esbuild/.build`
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the archive output directory.
    ///
    /// Default: `<service>/.serverless`
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the target platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the module format.
    pub fn format(mut self, format: ModuleFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the compiler target.
    ///
    /// Default: `node18`
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the output extension, with or without the leading dot.
    ///
    /// Default: `.js`
    pub fn out_extension(mut self, extension: impl Into<String>) -> Self {
        self.out_extension = Some(extension.into());
        self
    }

    /// Sets how many entry points go into one compiler call.
    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the excluded packages.
    ///
    /// Default: `["aws-sdk"]`
    pub fn exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Sets the external package declarations.
    pub fn external(mut self, external: Vec<ExternalSpec>) -> Self {
        self.external = external;
        self
    }

    /// Selects the package manager.
    pub fn packager(mut self, packager: PackagerKind) -> Self {
        self.packager = packager;
        self
    }

    /// Sets package manager options.
    pub fn packager_options(mut self, options: PackagerOptions) -> Self {
        self.packager_options = options;
        self
    }

    /// Sets extra install arguments.
    pub fn install_extra_args(mut self, args: Vec<String>) -> Self {
        self.install_extra_args = args;
        self
    }

    /// Uses the system `zip` binary for archives.
    pub fn native_zip(mut self, native_zip: bool) -> Self {
        self.native_zip = native_zip;
        self
    }

    /// Reuses an existing build directory instead of compiling.
    pub fn skip_build(mut self, skip_build: bool) -> Self {
        self.skip_build = skip_build;
        self
    }

    /// Requests the compiler metafile.
    pub fn metafile(mut self, metafile: bool) -> Self {
        self.metafile = metafile;
        self
    }

    /// Keeps the build directory after packaging.
    pub fn keep_output_directory(mut self, keep: bool) -> Self {
        self.keep_output_directory = keep;
        self
    }

    /// Packages each function into its own archive.
    pub fn individually(mut self, individually: bool) -> Self {
        self.individually = individually;
        self
    }

    /// Sets extra glob patterns included in archives.
    pub fn package_patterns(mut self, patterns: Vec<String>) -> Self {
        self.package_patterns = patterns;
        self
    }

    /// Sets options forwarded verbatim to the compiler.
    pub fn pass_through(mut self, options: BTreeMap<String, Value>) -> Self {
        self.pass_through = options;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `service_path` is missing, or [`Error::Config`]
    /// if the build directory contains the service root.
    pub fn build(self) -> Result<BuildSettings> {
        let service_path = self.service_path.context("service_path is required")?;
        let build_dir = self
            .build_dir
            .unwrap_or_else(|| service_path.join(".esbuild").join(".build"));
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| service_path.join(".serverless"));
        check_build_dir(&service_path, &build_dir)?;

        let out_extension = match self.out_extension {
            Some(ext) if ext.starts_with('.') => ext,
            Some(ext) => format!(".{ext}"),
            None => DEFAULT_OUT_EXTENSION.to_string(),
        };

        Ok(BuildSettings {
            service_path,
            build_dir,
            output_dir,
            platform: self.platform,
            format: self.format,
            target: self.target.unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            out_extension,
            concurrency: self.concurrency,
            exclude: self.exclude.unwrap_or_else(|| vec!["aws-sdk".to_string()]),
            externals: Externals::from_specs(&self.external),
            packager: self.packager,
            packager_options: self.packager_options,
            install_extra_args: self.install_extra_args,
            native_zip: self.native_zip,
            skip_build: self.skip_build,
            metafile: self.metafile,
            keep_output_directory: self.keep_output_directory,
            individually: self.individually,
            package_patterns: self.package_patterns,
            pass_through: self.pass_through,
        })
    }
}

/// Rejects build directories that would take the service sources with them
/// when erased.
fn check_build_dir(service_path: &Path, build_dir: &Path) -> Result<()> {
    let service = service_path
        .absolutize()
        .fs_context("resolving service path", service_path)?;
    let build = build_dir
        .absolutize()
        .fs_context("resolving build directory", build_dir)?;

    if service.starts_with(&*build) {
        return Err(Error::Config(format!(
            "build directory {} must not contain the service root {}",
            build.display(),
            service.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_derived_from_service_path() {
        let settings = SettingsBuilder::new().service_path("/srv/api").build().unwrap();
        assert_eq!(settings.build_dir(), Path::new("/srv/api/.esbuild/.build"));
        assert_eq!(settings.output_dir(), Path::new("/srv/api/.serverless"));
        assert_eq!(settings.out_extension(), ".js");
        assert_eq!(settings.exclude(), ["aws-sdk"]);
        assert_eq!(settings.service_name(), "api");
    }

    #[test]
    fn extension_gets_leading_dot() {
        let settings = SettingsBuilder::new()
            .service_path("/srv/api")
            .out_extension("mjs")
            .build()
            .unwrap();
        assert_eq!(settings.out_extension(), ".mjs");
    }

    #[test]
    fn build_dir_containing_service_is_rejected() {
        for build_dir in ["/srv/api", "/srv/api/.", "/srv", "/", "/srv/api/.esbuild/../.."] {
            let err = SettingsBuilder::new()
                .service_path("/srv/api")
                .build_dir(build_dir)
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{build_dir}: {err}");
        }
    }

    #[test]
    fn build_dir_beside_service_is_accepted() {
        let settings = SettingsBuilder::new()
            .service_path("/srv/api")
            .build_dir("/srv/api-build")
            .build()
            .unwrap();
        assert_eq!(settings.build_dir(), Path::new("/srv/api-build"));
    }

    #[test]
    fn service_path_is_required() {
        assert!(SettingsBuilder::new().build().is_err());
    }
}
