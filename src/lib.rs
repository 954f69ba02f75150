//! Serverless function build and packaging library
//!
//! This library provides:
//! - Batched, deduplicated compilation of function entry points
//! - Package manager integration (npm, yarn, pnpm, bun) for external modules
//! - Deterministic zip archives, natively or streamed in process
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
