//! Function packaging.
//!
//! Turns build results into deployable archives: one per function when
//! packaging individually, otherwise a single archive for the whole service.
//! Archives are written by a shared [`ZipEngine`] and reported with their
//! size and SHA-256 checksum.

mod external_modules;
mod files;

pub use external_modules::{InstalledModules, install_external_modules};
pub use files::{FileSelection, collect_files};

use crate::bundler::{
    Result,
    archive::ZipEngine,
    builder::{FunctionBuildResult, checksum::calculate_sha256},
    error::ErrorExt,
    settings::BuildSettings,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// One archive written to the output directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackagedArtifact {
    /// Function alias, or the service name for a service-wide archive
    pub alias: String,
    /// Archive location
    pub path: PathBuf,
    /// Archive size in bytes
    pub size: u64,
    /// SHA-256 of the archive, hex encoded
    pub checksum: String,
}

/// Packages the built functions into zip archives under the output directory.
pub async fn pack_functions(
    results: &[FunctionBuildResult],
    settings: &BuildSettings,
    modules: &InstalledModules,
    engine: &ZipEngine,
) -> Result<Vec<PackagedArtifact>> {
    if results.is_empty() {
        log::info!("No functions to package");
        return Ok(Vec::new());
    }

    if settings.individually() {
        let packs = results.iter().map(|result| {
            pack_one(
                result.alias.clone(),
                vec![result.bundle_path.clone()],
                settings,
                modules,
                engine,
            )
        });
        return futures::future::try_join_all(packs).await;
    }

    let mut bundle_paths: Vec<String> = results.iter().map(|r| r.bundle_path.clone()).collect();
    bundle_paths.sort();
    bundle_paths.dedup();

    let artifact = pack_one(settings.service_name(), bundle_paths, settings, modules, engine).await?;
    Ok(vec![artifact])
}

async fn pack_one(
    alias: String,
    bundle_paths: Vec<String>,
    settings: &BuildSettings,
    modules: &InstalledModules,
    engine: &ZipEngine,
) -> Result<PackagedArtifact> {
    let files = collect_files(FileSelection {
        build_dir: settings.build_dir().to_path_buf(),
        bundle_paths,
        patterns: settings.package_patterns().to_vec(),
        modules: modules.clone(),
    })
    .await?;

    let path = settings.output_dir().join(format!("{alias}.zip"));
    engine.zip(&path, &files).await?;

    let artifact = describe(alias, path).await?;
    log::info!(
        "✓ Created {} ({} bytes)",
        artifact.path.display(),
        artifact.size
    );
    Ok(artifact)
}

async fn describe(alias: String, path: PathBuf) -> Result<PackagedArtifact> {
    let size = tokio::fs::metadata(&path)
        .await
        .fs_context("reading archive metadata", &path)?
        .len();
    let checksum = calculate_sha256(&path).await?;
    Ok(PackagedArtifact {
        alias,
        path,
        size,
        checksum,
    })
}

/// Removes the build directory unless it was asked to be kept or is being reused.
pub async fn cleanup_build_dir(settings: &BuildSettings) -> Result<()> {
    if settings.keep_output_directory() || settings.skip_build() {
        return Ok(());
    }
    remove_build_dir(settings.build_dir()).await
}

async fn remove_build_dir(build_dir: &Path) -> Result<()> {
    log::debug!("Removing build directory {}", build_dir.display());
    fs::remove_dir_all(build_dir).await
}
