//! Error types for the fnpack binary.
//!
//! Library operations report [`crate::bundler::Error`]; this module wraps them
//! together with CLI and configuration failures for the command line surface.

use thiserror::Error;

/// Result type alias for binary-level operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all fnpack operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Configuration file could not be loaded
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidConfig {
        /// Path of the configuration file
        path: String,
        /// Reason for the error
        reason: String,
    },

    /// An artifact reported as created is missing on disk
    #[error("Artifact missing after packaging: {path}")]
    MissingArtifact {
        /// Expected artifact path
        path: String,
    },
}

impl BundlerError {
    /// Captured process output for failures caused by an external tool.
    pub fn process_output(&self) -> Option<(&str, &str)> {
        let mut error = match self {
            BundlerError::Bundler(error) => error,
            _ => return None,
        };
        loop {
            match error {
                crate::bundler::Error::SpawnFailed { stdout, stderr, .. } => {
                    return Some((stdout.as_str(), stderr.as_str()));
                }
                crate::bundler::Error::Compiler { source, .. } => error = source.as_ref(),
                _ => return None,
            }
        }
    }
}
