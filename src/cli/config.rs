//! Configuration file loading.
//!
//! `fnpack.toml` (or a `.json` file with the same keys) mirrors the host
//! framework's plugin options. Unknown keys are kept and forwarded to the
//! compiler verbatim.

use crate::bundler::{
    BuildSettings, Concurrency, ExternalSpec, FunctionEntry, FunctionHandle, ModuleFormat,
    PackagerKind, PackagerOptions, Platform, SettingsBuilder,
};
use crate::error::{CliError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Source extensions tried, in order, when a function declares no entry.
const ENTRY_EXTENSIONS: &[&str] = &[".ts", ".js", ".mts", ".mjs", ".cts", ".cjs", ".tsx", ".jsx"];

/// Work folder under the service root that holds the build directory.
const WORK_FOLDER: &str = ".esbuild";

/// One function declaration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    /// Handler reference, `<module path>.<exported name>`
    pub handler: String,
    /// Entry source file; derived from the handler when absent
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Parsed configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub service_path: Option<PathBuf>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub format: Option<ModuleFormat>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub out_extension: Option<String>,
    #[serde(default)]
    pub concurrency: Option<Concurrency>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub external: Vec<ExternalSpec>,
    #[serde(default)]
    pub packager: Option<PackagerKind>,
    #[serde(default)]
    pub packager_options: PackagerOptions,
    #[serde(default)]
    pub install_extra_args: Vec<String>,
    #[serde(default)]
    pub native_zip: bool,
    #[serde(default)]
    pub skip_build: bool,
    #[serde(default)]
    pub metafile: bool,
    #[serde(default)]
    pub keep_output_directory: bool,
    #[serde(default)]
    pub individually: bool,
    #[serde(default)]
    pub package_patterns: Vec<String>,
    /// Build directory, relative to the `.esbuild` work folder
    #[serde(default)]
    pub output_build_folder: Option<PathBuf>,
    /// Archive directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionConfig>,
    /// Everything else, forwarded to the compiler
    #[serde(flatten)]
    pub pass_through: BTreeMap<String, Value>,
}

impl ConfigFile {
    /// Loads a TOML file, or JSON when the extension is `.json`.
    pub async fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| CliError::InvalidConfig {
            path: path.display().to_string(),
            reason,
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| invalid(e.to_string()))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| invalid(e.to_string()))?
        };
        Ok(config)
    }

    /// Settings builder seeded with every configured option.
    pub fn settings_builder(&self, service_path: &Path) -> SettingsBuilder {
        let mut builder = SettingsBuilder::new()
            .service_path(service_path)
            .external(self.external.clone())
            .packager_options(self.packager_options.clone())
            .install_extra_args(self.install_extra_args.clone())
            .native_zip(self.native_zip)
            .skip_build(self.skip_build)
            .metafile(self.metafile)
            .keep_output_directory(self.keep_output_directory)
            .individually(self.individually)
            .package_patterns(self.package_patterns.clone())
            .pass_through(self.pass_through.clone());

        if let Some(platform) = self.platform {
            builder = builder.platform(platform);
        }
        if let Some(format) = self.format {
            builder = builder.format(format);
        }
        if let Some(target) = &self.target {
            builder = builder.target(target.clone());
        }
        if let Some(extension) = &self.out_extension {
            builder = builder.out_extension(extension.clone());
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(exclude) = &self.exclude {
            builder = builder.exclude(exclude.clone());
        }
        if let Some(packager) = self.packager {
            builder = builder.packager(packager);
        }
        if let Some(dir) = &self.output_build_folder {
            builder = builder.build_dir(service_path.join(WORK_FOLDER).join(dir));
        }
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(service_path.join(dir));
        }
        builder
    }

    /// Builds settings for `service_path`.
    pub fn settings(&self, service_path: &Path) -> Result<BuildSettings> {
        Ok(self.settings_builder(service_path).build()?)
    }

    /// One entry per declared function, in alias order.
    pub fn function_entries(&self, service_path: &Path) -> Result<Vec<FunctionEntry>> {
        self.functions
            .iter()
            .map(|(alias, function)| {
                let entry_path = match &function.entry {
                    Some(entry) => entry.clone(),
                    None => resolve_entry(service_path, alias, &function.handler)?,
                };
                Ok(FunctionEntry::new(
                    entry_path,
                    alias.clone(),
                    FunctionHandle {
                        name: function.name.clone(),
                        handler: function.handler.clone(),
                    },
                ))
            })
            .collect()
    }
}

/// Finds the source file a handler reference points at.
///
/// `src/users.handler` resolves to the first of `src/users.ts`,
/// `src/users.js`, ... that exists under the service root.
fn resolve_entry(service_path: &Path, alias: &str, handler: &str) -> Result<String> {
    let module = handler
        .rsplit_once('.')
        .map(|(module, _)| module)
        .unwrap_or(handler);

    ENTRY_EXTENSIONS
        .iter()
        .map(|ext| format!("{module}{ext}"))
        .find(|candidate| service_path.join(candidate).is_file())
        .ok_or_else(|| {
            CliError::InvalidArguments {
                reason: format!(
                    "no source file found for function '{alias}' (handler '{handler}')"
                ),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
platform = "node"
target = "node20"
concurrency = 2
exclude = ["aws-sdk", "sharp"]
external = ["pg", { sharp = { scripts = ["rebuild"] } }]
packager = "pnpm"
individually = true
minify = true

[packagerOptions]
scripts = ["echo done"]

[functions.users]
handler = "src/users.handler"

[functions.orders]
handler = "src/orders.main"
entry = "src/orders/index.ts"
"#;

    #[test]
    fn parses_toml_and_collects_pass_through() {
        let config: ConfigFile = toml::from_str(TOML).unwrap();
        assert_eq!(config.target.as_deref(), Some("node20"));
        assert_eq!(config.packager, Some(PackagerKind::Pnpm));
        assert_eq!(config.external.len(), 2);
        assert_eq!(config.packager_options.scripts, ["echo done"]);
        assert!(config.individually);
        assert_eq!(config.pass_through.get("minify"), Some(&Value::Bool(true)));
        assert!(!config.pass_through.contains_key("functions"));
    }

    #[test]
    fn derives_entries_from_handlers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/users.ts"), "").unwrap();

        let config: ConfigFile = toml::from_str(TOML).unwrap();
        let entries = config.function_entries(dir.path()).unwrap();

        assert_eq!(entries[0].alias, "orders");
        assert_eq!(entries[0].entry_path, "src/orders/index.ts");
        assert_eq!(entries[1].alias, "users");
        assert_eq!(entries[1].entry_path, "src/users.ts");
    }

    #[test]
    fn unresolvable_handler_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_entry(dir.path(), "users", "src/users.handler").unwrap_err();
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn settings_honour_directories() {
        let config: ConfigFile = toml::from_str(
            r#"
outputBuildFolder = "build"
outputDir = "dist"
"#,
        )
        .unwrap();
        let settings = config.settings(Path::new("/srv/app")).unwrap();
        assert_eq!(settings.build_dir(), Path::new("/srv/app/.esbuild/build"));
        assert_eq!(settings.output_dir(), Path::new("/srv/app/dist"));
    }

    #[test]
    fn build_folder_escaping_to_service_root_is_rejected() {
        for folder in ["..", "../..", "/"] {
            let config: ConfigFile =
                toml::from_str(&format!("outputBuildFolder = {folder:?}\n")).unwrap();
            let err = config.settings(Path::new("/srv/app")).unwrap_err();
            assert!(err.to_string().contains("Configuration error"), "{folder}: {err}");
        }
    }
}
