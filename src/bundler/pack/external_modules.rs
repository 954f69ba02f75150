//! Installation of external packages into the build directory.
//!
//! Externals are left out of the bundles by the compiler, so they have to be
//! shipped as real modules next to them. A trimmed manifest listing only those
//! packages is generated in the build directory and the configured package
//! manager installs it there.

use crate::bundler::{
    Result,
    error::ErrorExt,
    packager::{Lockfile, Packager, manifest::{MANIFEST_NAME, read_manifest}},
    settings::BuildSettings,
    utils::fs,
};
use serde_json::{Map, Value, json};
use std::path::{Component, Path};

/// Packages installed into the build directory's `node_modules`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstalledModules {
    /// Names of the externals that were installed
    pub names: Vec<String>,
    /// Whether module trees must be dereferenced when archived
    pub follow_links: bool,
}

impl InstalledModules {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Installs the configured externals into the build directory.
///
/// Returns an empty set without touching the package manager when there is
/// nothing to install or installing is disabled.
pub async fn install_external_modules(
    settings: &BuildSettings,
    packager: &dyn Packager,
) -> Result<InstalledModules> {
    let targets = settings.externals().install_targets(settings.exclude());
    if targets.is_empty() || settings.packager_options().no_install {
        return Ok(InstalledModules::default());
    }

    let service_path = settings.service_path();
    let build_dir = settings.build_dir();
    let root_deps = packager.get_prod_dependencies(service_path).await;

    let mut dependencies = Map::new();
    for name in &targets {
        match root_deps.version_of(name) {
            Some(version) => {
                dependencies.insert(name.clone(), Value::String(version.to_string()));
            }
            None => log::warn!(
                "External '{}' is not a production dependency of {}, skipping",
                name,
                service_path.display()
            ),
        }
    }
    if dependencies.is_empty() {
        return Ok(InstalledModules::default());
    }
    let names: Vec<String> = dependencies.keys().cloned().collect();

    let root_manifest = read_manifest(service_path).await.unwrap_or(Value::Null);
    let scripts = script_commands(settings);
    let manifest = generated_manifest(
        settings,
        &root_manifest,
        packager.copy_package_section_names(),
        dependencies,
        &scripts,
    );

    fs::create_dir_all(build_dir, false).await?;
    let manifest_path = build_dir.join(MANIFEST_NAME);
    tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
        .await
        .fs_context("writing generated manifest", &manifest_path)?;

    let use_lockfile = copy_lockfile(service_path, build_dir, packager).await?;

    let mut extra_args = settings.install_extra_args().to_vec();
    extra_args.extend_from_slice(&settings.packager_options().extra_args);

    packager.install(build_dir, &extra_args, use_lockfile).await?;
    packager.prune(build_dir).await?;

    let script_names: Vec<String> = (0..scripts.len()).map(script_name).collect();
    packager.run_scripts(build_dir, &script_names).await?;

    log::info!("✓ Installed {} external module(s)", names.len());

    Ok(InstalledModules {
        names,
        follow_links: packager.must_copy_modules(),
    })
}

/// Packager scripts followed by the scripts attached to individual externals.
fn script_commands(settings: &BuildSettings) -> Vec<String> {
    let mut scripts = settings.packager_options().scripts.clone();
    scripts.extend(settings.externals().post_install_scripts());
    scripts
}

fn script_name(index: usize) -> String {
    format!("script{index}")
}

fn generated_manifest(
    settings: &BuildSettings,
    root: &Value,
    sections: &[&str],
    dependencies: Map<String, Value>,
    scripts: &[String],
) -> Value {
    let name = root
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| settings.service_name());
    let version = root.get("version").and_then(Value::as_str).unwrap_or("1.0.0");

    let mut manifest = json!({
        "name": name,
        "version": version,
        "private": true,
        "dependencies": dependencies,
    });

    if let Value::Object(map) = &mut manifest {
        for section in sections {
            if let Some(value) = root.get(*section) {
                map.insert((*section).to_string(), value.clone());
            }
        }
        if !scripts.is_empty() {
            let scripts: Map<String, Value> = scripts
                .iter()
                .enumerate()
                .map(|(i, command)| (script_name(i), Value::String(command.clone())))
                .collect();
            map.insert("scripts".to_string(), Value::Object(scripts));
        }
    }

    manifest
}

/// Copies the service lockfile next to the generated manifest.
///
/// Returns whether a lockfile was found.
async fn copy_lockfile(
    service_path: &Path,
    build_dir: &Path,
    packager: &dyn Packager,
) -> Result<bool> {
    let source = service_path.join(packager.lockfile_name());
    if !tokio::fs::try_exists(&source)
        .await
        .fs_context("checking lockfile", &source)?
    {
        return Ok(false);
    }

    let lockfile = Lockfile::load(&source).await?;
    let rebased = packager.rebase_lockfile(&relative_root(service_path, build_dir), lockfile);
    rebased.write(&build_dir.join(packager.lockfile_name())).await?;

    log::debug!("Copied lockfile {}", source.display());
    Ok(true)
}

/// Path leading from `build_dir` back to `service_path`.
///
/// `../..` for the default `.esbuild/.build` layout; the absolute service path
/// when the build directory lives elsewhere.
fn relative_root(service_path: &Path, build_dir: &Path) -> String {
    match build_dir.strip_prefix(service_path) {
        Ok(inner) => {
            let depth = inner
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count();
            vec![".."; depth].join("/")
        }
        Err(_) => service_path.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{ExternalSpec, PackagerOptions, SettingsBuilder};

    #[test]
    fn relative_root_counts_build_depth() {
        let service = Path::new("/srv/app");
        assert_eq!(relative_root(service, Path::new("/srv/app/.esbuild/.build")), "../..");
        assert_eq!(relative_root(service, Path::new("/tmp/out")), "/srv/app");
    }

    #[test]
    fn manifest_copies_sections_and_numbers_scripts() {
        let settings = SettingsBuilder::new()
            .service_path("/srv/app")
            .packager_options(PackagerOptions {
                scripts: vec!["echo one".into()],
                ..Default::default()
            })
            .external(vec![ExternalSpec::Name("pg".into())])
            .build()
            .unwrap();
        let root = json!({
            "name": "app",
            "version": "2.0.0",
            "resolutions": {"left-pad": "1.3.0"},
            "devDependencies": {"jest": "29"}
        });
        let mut deps = Map::new();
        deps.insert("pg".into(), json!("^8.0.0"));

        let manifest = generated_manifest(
            &settings,
            &root,
            &["resolutions"],
            deps,
            &script_commands(&settings),
        );

        assert_eq!(manifest["name"], "app");
        assert_eq!(manifest["version"], "2.0.0");
        assert_eq!(manifest["private"], true);
        assert_eq!(manifest["dependencies"]["pg"], "^8.0.0");
        assert_eq!(manifest["resolutions"]["left-pad"], "1.3.0");
        assert_eq!(manifest["scripts"]["script0"], "echo one");
        assert!(manifest.get("devDependencies").is_none());
    }

    #[tokio::test]
    async fn nothing_to_install_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .service_path(dir.path())
            .build()
            .unwrap();
        let packager = crate::bundler::packager::PackagerKind::Npm.packager();

        let installed = install_external_modules(&settings, packager.as_ref())
            .await
            .unwrap();
        assert!(installed.is_empty());
        assert!(!settings.build_dir().exists());
    }
}
