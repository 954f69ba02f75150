//! Yarn (classic) packager.

use super::{Lockfile, Packager, lockfile::rebase_yarn_lockfile, shim};
use async_trait::async_trait;

/// Yarn classic.
///
/// Has no prune command; `resolutions` must travel with the manifest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Yarn;

#[async_trait]
impl Packager for Yarn {
    fn command(&self) -> &str {
        shim("yarn", "yarn.cmd")
    }

    fn lockfile_name(&self) -> &'static str {
        "yarn.lock"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &["resolutions"]
    }

    fn must_copy_modules(&self) -> bool {
        false
    }

    fn lockfile_args(&self, use_lockfile: bool) -> Vec<String> {
        if use_lockfile {
            vec!["--frozen-lockfile".to_string()]
        } else {
            vec!["--no-lockfile".to_string()]
        }
    }

    fn rebase_lockfile(&self, new_root: &str, lockfile: Lockfile) -> Lockfile {
        match lockfile {
            Lockfile::Text(text) => Lockfile::Text(rebase_yarn_lockfile(new_root, &text)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebases_text_lockfile() {
        let lock = Lockfile::Text("\"a@file:../a\":\n  version \"1.0.0\"\n".to_string());
        let Lockfile::Text(text) = Yarn.rebase_lockfile("..", lock) else {
            panic!("expected text lockfile");
        };
        assert!(text.starts_with("\"a@file:../../a\":"));
    }
}
