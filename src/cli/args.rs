//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// Build and package serverless functions
#[derive(Parser, Debug)]
#[command(
    name = "fnpack",
    version,
    about = "Build and package serverless functions",
    long_about = "Compiles function entry points with esbuild, installs external packages and writes one zip archive per function (or per service).

Usage:
  fnpack --config fnpack.toml
  fnpack --config services/users/fnpack.toml --native-zip
  fnpack --config fnpack.toml --skip-build

Exit code 0 = every reported archive exists."
)]
pub struct Args {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE", default_value = "fnpack.toml")]
    pub config: PathBuf,

    /// Service root; defaults to the configuration's servicePath, then its directory
    #[arg(short = 's', long, value_name = "DIR")]
    pub service_path: Option<PathBuf>,

    /// Reuse bundles already present in the build directory
    #[arg(long)]
    pub skip_build: bool,

    /// Archive with the system zip binary
    #[arg(long)]
    pub native_zip: bool,

    /// Stop after compiling
    #[arg(long)]
    pub no_package: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Configuration path cannot be empty".to_string());
        }
        if let Some(dir) = &self.service_path {
            if !dir.is_dir() {
                return Err(format!("Service path is not a directory: {}", dir.display()));
            }
        }
        Ok(())
    }
}
