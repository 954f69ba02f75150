//! Bun packager.

use super::Packager;
use async_trait::async_trait;

/// Bun. Binary lockfile, no prune.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bun;

#[async_trait]
impl Packager for Bun {
    fn command(&self) -> &str {
        "bun"
    }

    fn lockfile_name(&self) -> &'static str {
        "bun.lockb"
    }

    fn must_copy_modules(&self) -> bool {
        false
    }

    fn lockfile_args(&self, use_lockfile: bool) -> Vec<String> {
        if use_lockfile {
            vec!["--frozen-lockfile".to_string()]
        } else {
            vec!["--no-save".to_string()]
        }
    }
}
