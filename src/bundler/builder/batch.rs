//! Entry point deduplication and batch partitioning.

use crate::bundler::settings::{Concurrency, FunctionEntry};
use std::collections::HashSet;

/// Unique entry paths in order of first occurrence.
pub fn unique_entry_paths(entries: &[FunctionEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.entry_path.as_str()))
        .map(|entry| entry.entry_path.clone())
        .collect()
}

/// Splits entry paths into consecutive batches of at most `concurrency` items.
///
/// Unbounded concurrency yields a single batch; an empty input yields none.
pub fn partition(entry_paths: &[String], concurrency: Concurrency) -> Vec<Vec<String>> {
    if entry_paths.is_empty() {
        return Vec::new();
    }
    match concurrency {
        Concurrency::Unbounded => vec![entry_paths.to_vec()],
        Concurrency::Limit(limit) => entry_paths
            .chunks(limit.get())
            .map(<[String]>::to_vec)
            .collect(),
    }
}

/// Replaces the extension of `entry_path` with `out_extension` (which includes the dot).
pub fn bundle_path_for(entry_path: &str, out_extension: &str) -> String {
    let file_start = entry_path.rfind('/').map_or(0, |i| i + 1);
    let stem_end = match entry_path[file_start..].rfind('.') {
        Some(0) | None => entry_path.len(),
        Some(dot) => file_start + dot,
    };
    format!("{}{}", &entry_path[..stem_end], out_extension)
}
