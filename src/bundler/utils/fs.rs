//! File system utilities for building and packaging.
//!
//! Provides idempotent directory operations and the link-or-copy primitive
//! used when staging files for native zip.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Hard-links `from` to `to`, falling back to a full copy when linking fails.
///
/// Any link failure triggers the copy; the cause is not inspected.
pub async fn link_or_copy(from: &Path, to: &Path) -> Result<()> {
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }

    match fs::hard_link(from, to).await {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!(
                "Hard link {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            fs::copy(from, to).await.fs_context("copying file", to)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn link_or_copy_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();

        let dst = dir.path().join("nested/deeper/a.txt");
        link_or_copy(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn link_or_copy_falls_back_when_destination_exists() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"new").unwrap();
        let dst = dir.path().join("b.txt");
        std::fs::write(&dst, b"old").unwrap();

        // hard_link refuses existing targets; the copy overwrites
        link_or_copy(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"new");
    }

    #[tokio::test]
    async fn remove_dir_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing");
        remove_dir_all(&target).await.unwrap();
        create_dir_all(&target, true).await.unwrap();
        assert!(target.is_dir());
    }
}
