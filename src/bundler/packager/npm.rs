//! npm packager.

use super::{Lockfile, Packager, lockfile::rebase_json_lockfile, shim};
use crate::bundler::{Result, utils::spawn_process};
use async_trait::async_trait;
use std::path::Path;

/// npm.
///
/// Its JSON lockfile embeds `file:` references, which are rebased when the
/// lockfile moves into the build directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct Npm;

#[async_trait]
impl Packager for Npm {
    fn command(&self) -> &str {
        shim("npm", "npm.cmd")
    }

    fn lockfile_name(&self) -> &'static str {
        "package-lock.json"
    }

    fn must_copy_modules(&self) -> bool {
        true
    }

    fn lockfile_args(&self, use_lockfile: bool) -> Vec<String> {
        if use_lockfile {
            Vec::new()
        } else {
            vec!["--no-package-lock".to_string()]
        }
    }

    fn rebase_lockfile(&self, new_root: &str, lockfile: Lockfile) -> Lockfile {
        match lockfile {
            Lockfile::Json(mut value) => {
                rebase_json_lockfile(new_root, &mut value);
                Lockfile::Json(value)
            }
            other => other,
        }
    }

    async fn prune(&self, cwd: &Path) -> Result<()> {
        spawn_process(self.command(), ["prune"], cwd).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rebases_json_lockfile() {
        let lock = Lockfile::Json(json!({
            "dependencies": {"local": {"version": "file:../local"}}
        }));
        let Lockfile::Json(value) = Npm.rebase_lockfile("../..", lock) else {
            panic!("expected json lockfile");
        };
        assert_eq!(value["dependencies"]["local"]["version"], "file:../../../local");
    }
}
