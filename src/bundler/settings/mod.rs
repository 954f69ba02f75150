//! Configuration structures for build and packaging operations.
//!
//! This module provides the effective build configuration, the external
//! package declaration formats, function entries, and a builder for
//! constructing settings.

mod builder;
mod core;
mod external;
mod format;
mod function;

// Re-export all public types
pub use builder::{DEFAULT_OUT_EXTENSION, DEFAULT_TARGET, SettingsBuilder};
pub use core::{
    BuildSettings, Concurrency, ORCHESTRATOR_KEYS, PackagerOptions, strip_orchestrator_keys,
};
pub use external::{EXCLUDE_ALL, ExternalDirectives, ExternalSpec, Externals};
pub use format::{ModuleFormat, Platform, is_esm, validate_out_extension};
pub use function::{FunctionEntry, FunctionHandle};
