//! Command line interface for fnpack.
//!
//! A thin driver over the library: load the configuration, build, install
//! externals, package, then report every archive with its checksum.

mod args;
mod config;

pub use args::Args;
pub use config::{ConfigFile, FunctionConfig};

use crate::bundler::{
    BatchBuildOrchestrator, EsbuildCompiler, StatCache, ZipEngine, ZipMode,
    builder::tool_detection::HAS_NATIVE_ZIP,
    pack,
};
use crate::error::{CliError, Result};
use path_absolutize::Absolutize;
use std::{path::PathBuf, sync::Arc};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    execute(&args).await
}

/// Runs the whole pipeline for parsed arguments.
pub async fn execute(args: &Args) -> Result<i32> {
    let config = ConfigFile::load(&args.config).await?;
    let service_path = resolve_service_path(args, &config)?;

    let entries = config.function_entries(&service_path)?;
    let mut builder = config.settings_builder(&service_path);
    if args.skip_build {
        builder = builder.skip_build(true);
    }
    if args.native_zip {
        builder = builder.native_zip(true);
    }
    let settings = builder.build()?;

    let compiler = Arc::new(EsbuildCompiler::locate(settings.service_path()));
    let results = BatchBuildOrchestrator::new(settings.clone(), compiler)
        .build(&entries)
        .await?;

    if args.no_package {
        for result in &results {
            println!("{}  {}", result.alias, result.bundle_path);
        }
        return Ok(0);
    }

    let packager = settings.packager().packager();
    let modules = pack::install_external_modules(&settings, packager.as_ref()).await?;

    let engine = ZipEngine::new(zip_mode(settings.native_zip())).with_stat_cache(StatCache::new());
    let artifacts = pack::pack_functions(&results, &settings, &modules, &engine).await?;
    pack::cleanup_build_dir(&settings).await?;

    for artifact in &artifacts {
        if !artifact.path.is_file() {
            return Err(CliError::MissingArtifact {
                path: artifact.path.display().to_string(),
            }
            .into());
        }
        println!(
            "{}  {}  ({} bytes)",
            artifact.checksum,
            artifact.path.display(),
            artifact.size
        );
    }

    Ok(0)
}

fn zip_mode(native_requested: bool) -> ZipMode {
    if !native_requested {
        return ZipMode::Streaming;
    }
    if *HAS_NATIVE_ZIP {
        ZipMode::Native
    } else {
        log::warn!("zip binary not found, falling back to streaming archives");
        ZipMode::Streaming
    }
}

/// `--service-path`, then the configured `servicePath` (relative to the
/// configuration file), then the configuration file's directory.
fn resolve_service_path(args: &Args, config: &ConfigFile) -> Result<PathBuf> {
    let config_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let path = match (&args.service_path, &config.service_path) {
        (Some(flag), _) => flag.clone(),
        (None, Some(configured)) => config_dir.join(configured),
        (None, None) => config_dir,
    };

    Ok(path.absolutize()?.into_owned())
}
