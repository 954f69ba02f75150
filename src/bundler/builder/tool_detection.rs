//! External tool detection and availability checking.
//!
//! Probes for tools used by optional strategies (the native `zip` binary)
//! once per process.

use std::sync::LazyLock;

/// Check if a working `zip` binary is available for native archive creation.
///
/// Cached result to avoid repeated subprocess calls while packaging.
pub static HAS_NATIVE_ZIP: LazyLock<bool> = LazyLock::new(|| match which::which("zip") {
    Ok(path) => {
        log::debug!("Found zip at: {}", path.display());

        match std::process::Command::new(&path).arg("-v").output() {
            Ok(output) if output.status.success() => {
                let banner = String::from_utf8_lossy(&output.stdout);
                let first = banner.lines().nth(1).unwrap_or_default();
                log::debug!("✓ zip available: {}", first.trim());
                true
            }
            Ok(output) => {
                log::warn!(
                    "zip found at {} but -v check failed (exit code: {:?}). \
                         Native zip packaging will be unavailable. \
                         Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "zip found at {} but failed to execute: {}. \
                         Native zip packaging will be unavailable.",
                    path.display(),
                    e
                );
                false
            }
        }
    }
    Err(e) => {
        log::debug!("zip not found in PATH: {}", e);
        false
    }
});
