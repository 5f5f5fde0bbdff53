//! Capture acquisition: where the lsof field stream comes from.
//!
//! Three sources, in priority order: an explicit `--input` file, piped
//! stdin, or a live invocation of lsof with operator-supplied flags passed
//! through verbatim. The child's stderr is inherited so lsof's own
//! diagnostics reach the operator unchanged.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to read capture file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read capture from stdin: {0}")]
    ReadStdin(#[source] io::Error),

    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The inspection command ran but failed; its exit status must be
    /// forwarded to our own caller, with no graph output produced.
    #[error("'{command}' exited with status {status}")]
    CommandFailed { command: String, status: i32 },
}

impl CaptureError {
    /// Exit status to forward when the inspection command failed.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            CaptureError::CommandFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reads a saved capture from a file.
pub fn read_file(path: &Path) -> Result<String, CaptureError> {
    debug!("Reading capture from file: {}", path.display());
    fs::read_to_string(path).map_err(|source| CaptureError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a piped capture from stdin to end-of-stream.
pub fn read_stdin() -> Result<String, CaptureError> {
    debug!("Reading capture from stdin");
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(CaptureError::ReadStdin)?;
    Ok(buf)
}

/// Invokes `<lsof_path> -n -F <extra_args>` and captures its stdout.
///
/// `-n` keeps addresses numeric and `-F` selects the field-tagged output
/// format this tool parses; everything else is the operator's business.
pub fn run_lsof(lsof_path: &str, extra_args: &[String]) -> Result<String, CaptureError> {
    info!("Invoking {} -n -F {}", lsof_path, extra_args.join(" "));
    let output = Command::new(lsof_path)
        .arg("-n")
        .arg("-F")
        .args(extra_args)
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| CaptureError::Spawn {
            command: lsof_path.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(CaptureError::CommandFailed {
            command: lsof_path.to_string(),
            status: output.status.code().unwrap_or(1),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Acquires the capture from the right source: `--input` file beats piped
/// stdin beats a live lsof run.
pub fn acquire(
    input: Option<&Path>,
    lsof_path: &str,
    lsof_args: &[String],
) -> Result<String, CaptureError> {
    if let Some(path) = input {
        return read_file(path);
    }
    if !io::stdin().is_terminal() {
        return read_stdin();
    }
    run_lsof(lsof_path, lsof_args)
}
