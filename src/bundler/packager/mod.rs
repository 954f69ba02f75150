//! Package manager abstraction.
//!
//! Each supported tool implements [`Packager`]. Implementations are stateless:
//! every operation receives the working directory explicitly. The variant in
//! use is chosen by configuration through [`PackagerKind`].
//!
//! | tool | lockfile | extra manifest sections | must copy modules |
//! |------|----------|-------------------------|-------------------|
//! | npm  | `package-lock.json` | - | yes |
//! | yarn | `yarn.lock` | `resolutions` | no |
//! | pnpm | `pnpm-lock.yaml` | `pnpm` | yes |
//! | bun  | `bun.lockb` | - | no |

mod bun;
pub mod lockfile;
pub mod manifest;
mod npm;
mod pnpm;
mod yarn;

pub use bun::Bun;
pub use lockfile::Lockfile;
pub use manifest::{DependenciesResult, DependencyInfo, read_prod_dependencies};
pub use npm::Npm;
pub use pnpm::Pnpm;
pub use yarn::Yarn;

use crate::bundler::{Error, Result, utils::spawn_process};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt, path::Path, str::FromStr};

/// Flag requesting a production-only install.
pub const PRODUCTION_FLAG: &str = "--production";

/// Uniform contract over external dependency managers.
#[async_trait]
pub trait Packager: Send + Sync {
    /// Executable invoked for this tool.
    fn command(&self) -> &str;

    /// Lockfile the tool produces.
    fn lockfile_name(&self) -> &'static str;

    /// Manifest sections, besides dependencies, needed for a correct install.
    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether installed modules must be materialized as real files in archives.
    fn must_copy_modules(&self) -> bool;

    /// Lockfile-related install arguments.
    fn lockfile_args(&self, use_lockfile: bool) -> Vec<String>;

    /// Production dependencies declared by the manifest in `cwd`.
    async fn get_prod_dependencies(&self, cwd: &Path) -> DependenciesResult {
        read_prod_dependencies(cwd).await
    }

    /// Rewrites path-relative lockfile entries for a new root.
    ///
    /// Identity unless the tool embeds relative paths.
    fn rebase_lockfile(&self, _new_root: &str, lockfile: Lockfile) -> Lockfile {
        lockfile
    }

    /// Installs dependencies into `cwd`, retrying once without the production flag.
    async fn install(&self, cwd: &Path, extra_args: &[String], use_lockfile: bool) -> Result<()> {
        install_with_fallback(
            self.command(),
            &self.lockfile_args(use_lockfile),
            extra_args,
            cwd,
        )
        .await
    }

    /// Removes non-production artifacts after install. No-op by default.
    async fn prune(&self, _cwd: &Path) -> Result<()> {
        Ok(())
    }

    /// Runs manifest scripts concurrently; fails if any of them fails.
    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<()> {
        run_scripts(self.command(), cwd, script_names).await
    }
}

/// Runs `command install --production <lockfile args> <extra args>` in `cwd`.
///
/// When the production install fails the same invocation is retried exactly
/// once without `--production`; the error of the retry is returned.
pub async fn install_with_fallback(
    command: &str,
    lockfile_args: &[String],
    extra_args: &[String],
    cwd: &Path,
) -> Result<()> {
    let mut args = vec!["install".to_string(), PRODUCTION_FLAG.to_string()];
    args.extend_from_slice(lockfile_args);
    args.extend_from_slice(extra_args);

    log::info!("Installing dependencies with {} in {}", command, cwd.display());

    match spawn_process(command, &args, cwd).await {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!(
                "Production install failed, retrying without {}: {}",
                PRODUCTION_FLAG,
                first_line(&e)
            );
            args.retain(|arg| arg != PRODUCTION_FLAG);
            spawn_process(command, &args, cwd).await.map(|_| ())
        }
    }
}

/// Runs `command run <name>` for every script concurrently.
pub async fn run_scripts(command: &str, cwd: &Path, script_names: &[String]) -> Result<()> {
    if script_names.is_empty() {
        return Ok(());
    }

    log::info!("Running scripts: {}", script_names.join(", "));

    let runs = script_names
        .iter()
        .map(|script| spawn_process(command, ["run", script.as_str()], cwd));
    futures::future::try_join_all(runs).await?;
    Ok(())
}

fn first_line(error: &Error) -> String {
    error.to_string().lines().next().unwrap_or_default().to_string()
}

/// Platform-specific executable name (`npm.cmd` on Windows).
pub(crate) fn shim(name: &'static str, windows_name: &'static str) -> &'static str {
    if cfg!(windows) { windows_name } else { name }
}

/// Supported package managers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagerKind {
    /// npm
    #[default]
    Npm,
    /// Yarn classic
    Yarn,
    /// pnpm
    Pnpm,
    /// Bun
    Bun,
}

impl PackagerKind {
    /// Returns the implementation for this tool.
    pub fn packager(self) -> Box<dyn Packager> {
        match self {
            PackagerKind::Npm => Box::new(Npm),
            PackagerKind::Yarn => Box::new(Yarn),
            PackagerKind::Pnpm => Box::new(Pnpm),
            PackagerKind::Bun => Box::new(Bun),
        }
    }

    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagerKind::Npm => "npm",
            PackagerKind::Yarn => "yarn",
            PackagerKind::Pnpm => "pnpm",
            PackagerKind::Bun => "bun",
        }
    }
}

impl fmt::Display for PackagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(PackagerKind::Npm),
            "yarn" => Ok(PackagerKind::Yarn),
            "pnpm" => Ok(PackagerKind::Pnpm),
            "bun" => Ok(PackagerKind::Bun),
            other => Err(Error::Config(format!(
                "unknown packager '{other}', expected one of npm, yarn, pnpm, bun"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table() {
        let npm = PackagerKind::Npm.packager();
        assert_eq!(npm.lockfile_name(), "package-lock.json");
        assert!(npm.must_copy_modules());
        assert!(npm.copy_package_section_names().is_empty());

        let yarn = PackagerKind::Yarn.packager();
        assert_eq!(yarn.lockfile_name(), "yarn.lock");
        assert!(!yarn.must_copy_modules());
        assert_eq!(yarn.copy_package_section_names(), ["resolutions"]);

        let pnpm = PackagerKind::Pnpm.packager();
        assert_eq!(pnpm.lockfile_name(), "pnpm-lock.yaml");
        assert_eq!(pnpm.copy_package_section_names(), ["pnpm"]);

        let bun = PackagerKind::Bun.packager();
        assert_eq!(bun.lockfile_name(), "bun.lockb");
        assert!(!bun.must_copy_modules());
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("pnpm".parse::<PackagerKind>().unwrap(), PackagerKind::Pnpm);
        assert!(matches!("cargo".parse::<PackagerKind>(), Err(Error::Config(_))));
    }

    #[test]
    fn lockfile_flags_per_tool() {
        assert!(PackagerKind::Npm.packager().lockfile_args(true).is_empty());
        assert_eq!(
            PackagerKind::Npm.packager().lockfile_args(false),
            ["--no-package-lock"]
        );
        assert_eq!(
            PackagerKind::Yarn.packager().lockfile_args(true),
            ["--frozen-lockfile"]
        );
        assert_eq!(PackagerKind::Bun.packager().lockfile_args(false), ["--no-save"]);
    }
}
