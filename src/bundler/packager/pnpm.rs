//! pnpm packager.

use super::{Packager, shim};
use crate::bundler::{Result, utils::spawn_process};
use async_trait::async_trait;
use std::path::Path;

/// pnpm.
///
/// Its `node_modules` is a symlink farm, so modules are dereferenced when
/// archived.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pnpm;

#[async_trait]
impl Packager for Pnpm {
    fn command(&self) -> &str {
        shim("pnpm", "pnpm.cmd")
    }

    fn lockfile_name(&self) -> &'static str {
        "pnpm-lock.yaml"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &["pnpm"]
    }

    fn must_copy_modules(&self) -> bool {
        true
    }

    fn lockfile_args(&self, use_lockfile: bool) -> Vec<String> {
        if use_lockfile {
            vec!["--frozen-lockfile".to_string()]
        } else {
            vec!["--no-lockfile".to_string()]
        }
    }

    async fn prune(&self, cwd: &Path) -> Result<()> {
        spawn_process(self.command(), ["prune"], cwd).await?;
        Ok(())
    }
}
