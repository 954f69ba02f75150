//! External process execution with fully captured output.

use crate::bundler::error::{Error, Result};
use std::{ffi::OsStr, path::Path, process::Stdio};
use tokio::process::Command;

/// Captured output of a successful process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

/// Runs `command args...` in `cwd` and waits for it.
///
/// Both streams are buffered in full. A process that cannot be started is
/// reported as [`Error::CommandFailed`]; a non-zero exit as
/// [`Error::SpawnFailed`] carrying stdout and stderr verbatim. Dropping the
/// returned future kills the process.
pub async fn spawn_process<I, S>(command: &str, args: I, cwd: &Path) -> Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|a| a.as_ref().to_os_string())
        .collect();
    let command_line = render_command(command, &args);

    log::debug!("Running `{}` in {}", command_line, cwd.display());

    let output = Command::new(command)
        .args(&args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: command.to_string(),
            error,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::SpawnFailed {
            command: command_line,
            code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(ProcessOutput { stdout, stderr })
}

fn render_command(command: &str, args: &[std::ffi::OsString]) -> String {
    let mut line = command.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}
