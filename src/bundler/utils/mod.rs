//! Filesystem, process and scratch-directory helpers shared by the bundler.

pub mod fs;
pub mod process;
pub mod scope;

pub use process::{ProcessOutput, spawn_process};
pub use scope::ResourceScope;
