//! Build orchestration and coordination.
//!
//! This module provides the [`BatchBuildOrchestrator`] that drives the
//! external compiler over many function entry points.
//!
//! # Overview
//!
//! The orchestrator:
//! 1. Validates the output extension against the module format
//! 2. Deduplicates entry points shared by several functions
//! 3. Partitions them into batches bounded by the configured concurrency
//! 4. Invokes the compiler once per batch, sequentially
//! 5. Maps every function back to its bundle path
//!
//! # Module Organization
//!
//! - [`batch`] - Deduplication, partitioning and output path derivation
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`compiler`] - The compiler contract
//! - [`esbuild`] - esbuild process implementation of the contract
//! - [`orchestrator`] - Main [`BatchBuildOrchestrator`] struct
//! - [`tool_detection`] - External tool availability checking

pub mod batch;
pub mod checksum;
pub mod compiler;
pub mod esbuild;
mod orchestrator;
pub mod tool_detection;

pub use compiler::{Compiler, CompilerOptions, CompilerOutput};
pub use esbuild::EsbuildCompiler;
pub use orchestrator::{
    BatchBuildOrchestrator, FileBuildResult, FunctionBuildResult, METAFILE_NAME, map_functions,
};
