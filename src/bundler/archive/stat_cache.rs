//! Shared file status cache.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// The parts of a file's status that archiving needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileStat {
    /// Whether the path resolves to a directory
    pub is_dir: bool,
    /// Permission bits
    pub mode: u32,
}

impl FileStat {
    /// Stats `path`, following symlinks.
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            is_dir: metadata.is_dir(),
            mode: permission_bits(&metadata),
        })
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Status cache shared by every archive written in one run.
///
/// Dependency trees are typically archived once per function; the cache keeps
/// the same `node_modules` file from being stat'ed again for each archive.
#[derive(Clone, Debug, Default)]
pub struct StatCache {
    entries: Arc<Mutex<HashMap<PathBuf, FileStat>>>,
}

impl StatCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached status of `path`, stat'ing it on first use.
    pub fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(stat) = self.lookup(path) {
            return Ok(stat);
        }
        let stat = FileStat::read(path)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(path.to_path_buf(), stat);
        }
        Ok(stat)
    }

    fn lookup(&self, path: &Path) -> Option<FileStat> {
        self.entries.lock().ok()?.get(path).copied()
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
