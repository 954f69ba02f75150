//! Serverless function build and packaging.
//!
//! The pipeline:
//! 1. [`BatchBuildOrchestrator`] compiles deduplicated entry points in
//!    sequential batches through a [`Compiler`]
//! 2. [`pack::install_external_modules`] installs unbundled packages with the
//!    configured [`Packager`]
//! 3. [`pack::pack_functions`] writes deterministic archives with a
//!    [`ZipEngine`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fnpack::bundler::{
//!     BatchBuildOrchestrator, EsbuildCompiler, FunctionEntry, FunctionHandle, SettingsBuilder,
//!     ZipEngine, pack,
//! };
//!
//! # async fn example() -> fnpack::bundler::Result<()> {
//! let settings = SettingsBuilder::new().service_path("services/users").build()?;
//! let entries = vec![FunctionEntry::new(
//!     "src/users.ts",
//!     "users",
//!     FunctionHandle { name: None, handler: "src/users.handler".into() },
//! )];
//!
//! let compiler = Arc::new(EsbuildCompiler::locate(settings.service_path()));
//! let results = BatchBuildOrchestrator::new(settings.clone(), compiler)
//!     .build(&entries)
//!     .await?;
//!
//! let packager = settings.packager().packager();
//! let modules = pack::install_external_modules(&settings, packager.as_ref()).await?;
//! let artifacts = pack::pack_functions(&results, &settings, &modules, &ZipEngine::default()).await?;
//!
//! for artifact in artifacts {
//!     println!("{} {}", artifact.path.display(), artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
pub mod error;
pub mod pack;
pub mod packager;
pub mod settings;
pub mod utils;

pub use archive::{IFile, StatCache, ZipEngine, ZipMode};
pub use builder::{
    BatchBuildOrchestrator, Compiler, CompilerOptions, CompilerOutput, EsbuildCompiler,
    FileBuildResult, FunctionBuildResult, METAFILE_NAME, map_functions,
};
pub use error::{Error, Result};
pub use pack::{InstalledModules, PackagedArtifact};
pub use packager::{Lockfile, Packager, PackagerKind};
pub use settings::{
    BuildSettings, Concurrency, ExternalSpec, FunctionEntry, FunctionHandle, ModuleFormat,
    PackagerOptions, Platform, SettingsBuilder,
};
pub use utils::ResourceScope;
