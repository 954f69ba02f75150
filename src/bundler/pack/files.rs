//! Collection of the files that go into one function archive.

use super::InstalledModules;
use crate::bundler::{
    Error, Result,
    archive::IFile,
    error::ErrorExt,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

const NODE_MODULES: &str = "node_modules";

/// Inputs for collecting one function's files.
#[derive(Clone, Debug)]
pub struct FileSelection {
    pub build_dir: PathBuf,
    pub bundle_paths: Vec<String>,
    pub patterns: Vec<String>,
    pub modules: InstalledModules,
}

/// Collects archive inputs for the given bundles, sorted by archive path.
///
/// Each bundle contributes itself and its `.map` sibling when present.
/// Pattern matches and installed modules are resolved under the build
/// directory.
pub async fn collect_files(selection: FileSelection) -> Result<Vec<IFile>> {
    tokio::task::spawn_blocking(move || collect_blocking(&selection))
        .await
        .map_err(|e| Error::GenericError(format!("File collection task panicked: {}", e)))?
}

fn collect_blocking(selection: &FileSelection) -> Result<Vec<IFile>> {
    let build_dir = selection.build_dir.as_path();
    let mut files = BTreeMap::new();

    for bundle_path in &selection.bundle_paths {
        let bundle = build_dir.join(bundle_path);
        std::fs::metadata(&bundle).fs_context("reading bundle", &bundle)?;
        insert(&mut files, build_dir, &bundle);

        let map = build_dir.join(format!("{bundle_path}.map"));
        if map.is_file() {
            insert(&mut files, build_dir, &map);
        }
    }

    for pattern in &selection.patterns {
        for path in glob_files(build_dir, pattern)? {
            insert(&mut files, build_dir, &path);
        }
    }

    if !selection.modules.is_empty() {
        for path in module_files(build_dir, selection.modules.follow_links)? {
            insert(&mut files, build_dir, &path);
        }
    }

    Ok(files.into_values().collect())
}

fn insert(files: &mut BTreeMap<String, IFile>, build_dir: &Path, path: &Path) {
    if let Some(file) = IFile::relative_to(build_dir, path) {
        files.entry(file.local_path.clone()).or_insert(file);
    }
}

/// Files under `build_dir` matching `pattern`.
fn glob_files(build_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&build_dir.to_string_lossy());
    let full = format!("{}/{}", base, pattern.trim_start_matches("./"));

    let mut matches = Vec::new();
    for entry in glob::glob(&full)? {
        let path = entry.map_err(|e| Error::IoError(e.into()))?;
        if path.is_file() {
            matches.push(path);
        }
    }
    Ok(matches)
}

/// Every installed module file, without the `.bin` link farm.
fn module_files(build_dir: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    let root = build_dir.join(NODE_MODULES);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(&root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() != 1 || e.file_name() != ".bin");
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
