//! Direct-streaming archive writer.
//!
//! Files are appended straight from their original locations. Every entry gets
//! the same fixed timestamp and keeps its source permission bits, so the same
//! inputs always produce the same bytes.

use super::{IFile, StatCache, stat_cache::FileStat};
use crate::bundler::{Error, Result, error::ErrorExt};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

/// Writes `files` into a new archive at `target`.
///
/// Entries whose source resolves to a directory are skipped. A partially
/// written target is left in place on failure.
pub async fn zip_streaming(
    target: &Path,
    files: &[IFile],
    stat_cache: Option<&StatCache>,
) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating archive directory", parent)?;
    }

    let target = target.to_path_buf();
    let files = files.to_vec();
    let stat_cache = stat_cache.cloned();

    tokio::task::spawn_blocking(move || write_archive(&target, &files, stat_cache.as_ref()))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

fn write_archive(target: &Path, files: &[IFile], stat_cache: Option<&StatCache>) -> Result<()> {
    let file = File::create(target).fs_context("creating archive", target)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in files {
        let stat = match stat_cache {
            Some(cache) => cache.stat(&entry.root_path),
            None => FileStat::read(&entry.root_path),
        }
        .fs_context("reading file status", &entry.root_path)?;

        if stat.is_dir {
            continue;
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(stat.mode);

        zip.start_file(entry.local_path.clone(), options)?;
        let mut source =
            File::open(&entry.root_path).fs_context("opening archive input", &entry.root_path)?;
        std::io::copy(&mut source, &mut zip).fs_context("writing archive entry", &entry.root_path)?;
    }

    let mut writer = zip.finish()?;
    writer.flush().fs_context("flushing archive", target)?;
    Ok(())
}
