//! Scoped temporary directories.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;
use tempfile::TempDir;

/// A uniquely named temporary directory removed when the scope ends.
///
/// Removal happens on every exit path: explicitly through [`ResourceScope::release`],
/// or on drop when an error unwinds the caller early. Nothing may assume the
/// directory outlives the scope.
#[derive(Debug)]
pub struct ResourceScope {
    dir: TempDir,
}

impl ResourceScope {
    /// Creates `<tmp>/<prefix>-XXXXXX`.
    pub fn acquire(prefix: &str) -> Result<Self> {
        let tmp = std::env::temp_dir();
        let dir = tempfile::Builder::new()
            .prefix(&format!("{prefix}-"))
            .tempdir_in(&tmp)
            .fs_context("creating temporary directory", &tmp)?;
        log::debug!("Acquired scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Directory owned by this scope.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory now, reporting removal failures.
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().fs_context("removing temporary directory", &path)?;
        log::debug!("Released scratch directory {}", path.display());
        Ok(())
    }
}
