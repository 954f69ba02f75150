//! Error types for build, packager and archive operations.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the bundler library.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Invalid build configuration, reported before any external process starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external compiler failed for one batch.
    #[error("Compiler failed on batch {batch}: {source}")]
    Compiler {
        /// Zero-based batch index
        batch: usize,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// An external process could not be started.
    #[error("Failed to run {command}: {error}")]
    CommandFailed {
        /// Command that was spawned
        command: String,
        /// Spawn error
        error: io::Error,
    },

    /// An external process exited unsuccessfully.
    #[error("{command} exited with code {code:?}\n{stderr}")]
    SpawnFailed {
        /// Command line that failed
        command: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Filesystem operation failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// Operation being performed
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// Zip archive error.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// JSON error.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Directory walk error.
    #[error("{0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid glob pattern.
    #[error("{0}")]
    Pattern(#[from] glob::PatternError),

    /// Free-form error.
    #[error("{0}")]
    GenericError(String),
}

/// Convenient way to return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

/// Attach a message to a failure or a missing value.
pub trait Context<T> {
    /// Wrap the error (or `None`) with a static message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error (or `None`) with a lazily built message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension for io results that records the operation and path.
pub trait ErrorExt<T> {
    /// Map an io error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_context_produces_generic_error() {
        let missing: Option<u8> = None;
        let err = missing.context("value is required").unwrap_err();
        assert_eq!(err.to_string(), "value is required");
    }

    #[test]
    fn fs_context_keeps_path() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.fs_context("reading manifest", "/tmp/x").unwrap_err();
        match err {
            Error::Fs { context, path, .. } => {
                assert_eq!(context, "reading manifest");
                assert_eq!(path, PathBuf::from("/tmp/x"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bail_formats_message() {
        fn fails(n: usize) -> Result<()> {
            crate::bail!("bad value {}", n);
        }
        assert_eq!(fails(3).unwrap_err().to_string(), "bad value 3");
    }
}
