//! Zip archive engine.
//!
//! Two strategies produce the same entry set:
//!
//! - [`ZipMode::Native`] stages inputs into a scratch directory and runs the
//!   system `zip` binary there.
//! - [`ZipMode::Streaming`] writes the archive directly with the `zip` crate,
//!   using a fixed entry timestamp so output is byte-for-byte reproducible.

mod native;
mod stat_cache;
mod streaming;

pub use native::zip_native;
pub use stat_cache::{FileStat, StatCache};
pub use streaming::zip_streaming;

use crate::bundler::Result;
use std::path::{Path, PathBuf};

/// One archive input.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct IFile {
    /// Entry name inside the archive, `/`-separated
    pub local_path: String,
    /// Absolute location of the source file
    pub root_path: PathBuf,
}

impl IFile {
    pub fn new(root_path: impl Into<PathBuf>, local_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            local_path: local_path.into(),
        }
    }

    /// Entry for `root_path` named by its path relative to `base`.
    ///
    /// Returns `None` when `root_path` is not under `base`.
    pub fn relative_to(base: &Path, root_path: &Path) -> Option<Self> {
        let relative = root_path.strip_prefix(base).ok()?;
        let local_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(Self::new(root_path, local_path))
    }
}

/// Archiving strategy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ZipMode {
    /// System `zip` binary over a staged copy
    Native,
    /// In-process writer with fixed timestamps
    #[default]
    Streaming,
}

/// Writes archives with a chosen [`ZipMode`].
#[derive(Clone, Debug, Default)]
pub struct ZipEngine {
    mode: ZipMode,
    stat_cache: Option<StatCache>,
}

impl ZipEngine {
    pub fn new(mode: ZipMode) -> Self {
        Self {
            mode,
            stat_cache: None,
        }
    }

    /// Shares `cache` across every archive this engine writes in streaming mode.
    pub fn with_stat_cache(mut self, cache: StatCache) -> Self {
        self.stat_cache = Some(cache);
        self
    }

    pub fn mode(&self) -> ZipMode {
        self.mode
    }

    /// Creates (or replaces) the archive at `target` containing `files`.
    pub async fn zip(&self, target: &Path, files: &[IFile]) -> Result<()> {
        log::debug!(
            "Archiving {} file(s) into {} ({:?})",
            files.len(),
            target.display(),
            self.mode
        );
        match self.mode {
            ZipMode::Native => zip_native(target, files).await,
            ZipMode::Streaming => zip_streaming(target, files, self.stat_cache.as_ref()).await,
        }
    }
}
