//! Native `zip` binary strategy.
//!
//! Inputs are staged into a scratch directory mirroring their archive paths,
//! then the system `zip` tool archives that directory. The scratch directory
//! is removed whatever the outcome. With nothing to stage, `zip` refuses to
//! run, so an empty archive is written directly instead.

use super::IFile;
use crate::bundler::{
    Result,
    error::{Context, ErrorExt},
    utils::{ResourceScope, fs::link_or_copy, spawn_process},
};
use path_absolutize::Absolutize;
use std::path::Path;

/// Archives `files` into `target` using the system `zip` binary.
pub async fn zip_native(target: &Path, files: &[IFile]) -> Result<()> {
    let target = target
        .absolutize()
        .fs_context("resolving archive path", target)?
        .into_owned();
    let stem = target
        .file_stem()
        .context("archive path has no file name")?
        .to_string_lossy()
        .into_owned();

    let scope = ResourceScope::acquire(&stem)?;
    let outcome = stage_and_zip(scope.path(), &target, files).await;
    let released = scope.release();

    outcome?;
    released
}

async fn stage_and_zip(staging: &Path, target: &Path, files: &[IFile]) -> Result<()> {
    let staged = stage_files(staging, files).await?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating archive directory", parent)?;
    }
    // zip updates an existing archive in place; start from nothing
    match tokio::fs::remove_file(target).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).fs_context("removing previous archive", target),
    }

    if staged == 0 {
        log::debug!("No files to archive, writing empty {}", target.display());
        return super::streaming::zip_streaming(target, &[], None).await;
    }

    let target_str = target.to_string_lossy();
    spawn_process("zip", ["-r", "-X", "-q", &*target_str, "."], staging).await?;

    log::debug!("Native zip wrote {}", target.display());
    Ok(())
}

/// Links (or copies) every input into `staging/<local_path>` concurrently.
///
/// Returns how many files were staged; directories are skipped.
async fn stage_files(staging: &Path, files: &[IFile]) -> Result<usize> {
    let stages = files.iter().map(|file| async move {
        let metadata = tokio::fs::metadata(&file.root_path)
            .await
            .fs_context("reading file status", &file.root_path)?;
        if metadata.is_dir() {
            return Ok::<bool, crate::bundler::Error>(false);
        }
        link_or_copy(&file.root_path, &staging.join(&file.local_path)).await?;
        Ok(true)
    });
    let staged = futures::future::try_join_all(stages).await?;
    Ok(staged.into_iter().filter(|&linked| linked).count())
}
